//! Enabled-item navigation.
//!
//! Pure functions over an [`ItemRegistry`]. `None` stands for the position
//! before the first item (nothing highlighted yet). When nothing qualifies
//! within one full pass, or the scan hits a boundary with `wrap` off, the
//! input comes back unchanged.

use crate::registry::ItemRegistry;

/// The next enabled index after `index`, scanning forward.
///
/// `next_enabled(None, ..)` yields the first enabled item. An index past
/// the end of the registry is stale and returned as-is.
pub fn next_enabled(index: Option<usize>, registry: &ItemRegistry, wrap: bool) -> Option<usize> {
    let len = registry.len();
    let start = match index {
        Some(i) if i < len => i + 1,
        Some(_) => return index,
        None => 0,
    };

    for step in 0..len {
        let mut candidate = start + step;
        if candidate >= len {
            if !wrap {
                break;
            }
            candidate %= len;
        }
        if registry.is_enabled(candidate) {
            return Some(candidate);
        }
    }
    index
}

/// The previous enabled index before `index`, scanning backward.
///
/// `prev_enabled(None, ..)` yields the last enabled item.
pub fn prev_enabled(index: Option<usize>, registry: &ItemRegistry, wrap: bool) -> Option<usize> {
    let len = registry.len();
    let origin = match index {
        Some(i) if i < len => i,
        Some(_) => return index,
        None => len,
    };

    for step in 1..=len {
        let candidate = if step <= origin {
            origin - step
        } else if wrap {
            origin + len - step
        } else {
            break;
        };
        if registry.is_enabled(candidate) {
            return Some(candidate);
        }
    }
    index
}

/// `index` itself when enabled, otherwise the next enabled index.
///
/// `None` when `index` is out of range or no other enabled item is reachable.
pub fn enabled_or_next(index: usize, registry: &ItemRegistry, wrap: bool) -> Option<usize> {
    if index >= registry.len() {
        return None;
    }
    if registry.is_enabled(index) {
        return Some(index);
    }
    next_enabled(Some(index), registry, wrap).filter(|&next| next != index)
}

/// The first enabled index, if any.
pub fn first_enabled(registry: &ItemRegistry) -> Option<usize> {
    next_enabled(None, registry, false)
}

/// The last enabled index, if any.
pub fn last_enabled(registry: &ItemRegistry) -> Option<usize> {
    prev_enabled(None, registry, false)
}
