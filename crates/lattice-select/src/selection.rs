//! Selection and highlight state.
//!
//! [`SelectionState`] is the only place the selected set and the highlighted
//! index change. Every operation tolerates stale or out-of-range indices by
//! doing nothing, and reports whether anything changed so callers know
//! when to notify.

use lattice_select_core::logging::targets;

use crate::navigation::enabled_or_next;
use crate::registry::ItemRegistry;

/// A selection mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionAction {
    /// Replace the selection with the target.
    Add,
    /// Insert the target if absent, remove it if present.
    Toggle,
    /// Remove the target if present.
    Remove,
}

/// Values of the selected items, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionProjection {
    pub values: Vec<String>,
    pub display_values: Vec<String>,
}

impl SelectionProjection {
    /// The value surfaced by a single-select widget.
    pub fn first_value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    /// The display value surfaced by a single-select widget.
    pub fn first_display_value(&self) -> Option<&str> {
        self.display_values.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Selected indices plus the highlighted index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: Vec<usize>,
    highlighted: Option<usize>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `action` to `index`.
    ///
    /// A disabled target is redirected to the next enabled item (wrapping
    /// when `wrap` is set) for `Add` and `Toggle`. If no other enabled item
    /// exists the call does nothing. Returns whether the selection changed.
    pub fn apply(
        &mut self,
        index: Option<usize>,
        action: SelectionAction,
        registry: &ItemRegistry,
        wrap: bool,
    ) -> bool {
        let Some(index) = index.filter(|&i| i < registry.len()) else {
            tracing::trace!(target: targets::SELECTION, ?index, ?action, "ignoring stale index");
            return false;
        };

        let target = match action {
            SelectionAction::Remove => return self.remove_index(index),
            SelectionAction::Add | SelectionAction::Toggle => {
                enabled_or_next(index, registry, wrap)
            }
        };
        let Some(target) = target else {
            tracing::debug!(
                target: targets::SELECTION,
                index,
                "disabled target has no enabled neighbour"
            );
            return false;
        };

        if action == SelectionAction::Add {
            if self.selected == [target] {
                return false;
            }
            self.selected.clear();
            self.selected.push(target);
        } else if !self.remove_index(target) {
            self.selected.push(target);
        }
        true
    }

    /// Replace the selection with `index`.
    pub fn add(&mut self, index: Option<usize>, registry: &ItemRegistry, wrap: bool) -> bool {
        self.apply(index, SelectionAction::Add, registry, wrap)
    }

    /// Flip membership of `index`.
    pub fn toggle(&mut self, index: Option<usize>, registry: &ItemRegistry, wrap: bool) -> bool {
        self.apply(index, SelectionAction::Toggle, registry, wrap)
    }

    /// Remove `index` from the selection.
    pub fn remove(&mut self, index: Option<usize>, registry: &ItemRegistry) -> bool {
        self.apply(index, SelectionAction::Remove, registry, false)
    }

    /// Empty the selection.
    pub fn clear(&mut self) -> bool {
        let changed = !self.selected.is_empty();
        self.selected.clear();
        changed
    }

    fn remove_index(&mut self, index: usize) -> bool {
        match self.selected.iter().position(|&i| i == index) {
            Some(pos) => {
                self.selected.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Selected indices in selection order.
    pub fn selected(&self) -> &[usize] {
        &self.selected
    }

    pub fn first_selected(&self) -> Option<usize> {
        self.selected.first().copied()
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    /// Move the highlight.
    ///
    /// `None` clears it. Disabled or out-of-range indices are refused.
    /// Returns whether the highlight changed.
    pub fn set_highlighted(&mut self, index: Option<usize>, registry: &ItemRegistry) -> bool {
        if let Some(i) = index
            && !registry.is_enabled(i)
        {
            return false;
        }
        if self.highlighted == index {
            return false;
        }
        self.highlighted = index;
        true
    }

    /// Values and display values of the selected items.
    pub fn projection(&self, registry: &ItemRegistry) -> SelectionProjection {
        let (values, display_values) = self
            .selected
            .iter()
            .filter_map(|&i| registry.get(i))
            .map(|item| (item.value().to_string(), item.display_value().to_string()))
            .unzip();
        SelectionProjection {
            values,
            display_values,
        }
    }
}
