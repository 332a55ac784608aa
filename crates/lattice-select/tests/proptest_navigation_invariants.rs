//! Property-based invariant tests for navigation, selection and inbound
//! binding reconciliation.
//!
//! For any registry (any length, any pattern of disabled items):
//!
//! 1. Navigation returns the input or an enabled index.
//! 2. Without wrap, the last enabled item has no successor.
//! 3. With wrap, stepping forward once per enabled item returns to the start.
//! 4. With wrap, `next` undoes `prev`.
//! 5. `add` never selects a disabled item and keeps at most one selected.
//! 6. `remove(k)` then `add(k)` equals `add(k)`.
//! 7. Reconciling with an item's value selects its first match, idempotently.

use lattice_select::binding::inbound_actions;
use lattice_select::navigation::{last_enabled, next_enabled, prev_enabled};
use lattice_select::{ItemDescriptor, ItemRegistry, SelectionState};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn registry_strategy() -> impl Strategy<Value = ItemRegistry> {
    prop::collection::vec((any::<bool>(), 0u8..4), 0..12).prop_map(|items| {
        ItemRegistry::from_descriptors(items.into_iter().enumerate().map(|(i, (disabled, value))| {
            ItemDescriptor::new(format!("Item {i}"))
                .with_value(format!("v{value}"))
                .with_disabled(disabled)
        }))
    })
}

fn enabled_indices(registry: &ItemRegistry) -> Vec<usize> {
    registry
        .iter()
        .filter(|item| !item.is_disabled())
        .map(|item| item.index())
        .collect()
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Navigation lands on the input or an enabled index
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn navigation_result_is_enabled_or_input(
        registry in registry_strategy(),
        start in prop::option::of(0usize..14),
        wrap in any::<bool>(),
    ) {
        for result in [
            next_enabled(start, &registry, wrap),
            prev_enabled(start, &registry, wrap),
        ] {
            prop_assert!(
                result == start || result.is_some_and(|i| registry.is_enabled(i)),
                "unexpected result {:?} from {:?}", result, start
            );
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. No wrap at the last enabled item
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn no_wrap_stops_at_last_enabled(registry in registry_strategy()) {
        if let Some(last) = last_enabled(&registry) {
            prop_assert_eq!(next_enabled(Some(last), &registry, false), Some(last));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Full loop returns to the start
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn wrap_cycles_through_every_enabled_item(registry in registry_strategy()) {
        let enabled = enabled_indices(&registry);
        for &start in &enabled {
            let mut current = Some(start);
            let mut visited = Vec::new();
            for _ in 0..enabled.len() {
                current = next_enabled(current, &registry, true);
                visited.push(current.unwrap_or(usize::MAX));
            }
            prop_assert_eq!(current, Some(start));
            visited.sort_unstable();
            prop_assert_eq!(&visited, &enabled);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. next undoes prev
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn next_inverts_prev_with_wrap(registry in registry_strategy()) {
        for start in enabled_indices(&registry) {
            let prev = prev_enabled(Some(start), &registry, true);
            prop_assert_eq!(next_enabled(prev, &registry, true), Some(start));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. add never selects a disabled item
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn add_selects_at_most_one_enabled_item(
        registry in registry_strategy(),
        targets in prop::collection::vec(0usize..14, 1..8),
        wrap in any::<bool>(),
    ) {
        let mut selection = SelectionState::new();
        for target in targets {
            selection.add(Some(target), &registry, wrap);
            prop_assert!(selection.selected().len() <= 1);
            for &index in selection.selected() {
                prop_assert!(registry.is_enabled(index), "disabled {} selected", index);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. remove + add ≡ add
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn remove_then_add_equals_add(
        registry in registry_strategy(),
        initial in prop::option::of(0usize..14),
        target in 0usize..14,
        wrap in any::<bool>(),
    ) {
        let mut base = SelectionState::new();
        base.add(initial, &registry, wrap);

        let mut direct = base.clone();
        direct.add(Some(target), &registry, wrap);

        let mut roundabout = base;
        roundabout.remove(Some(target), &registry);
        roundabout.add(Some(target), &registry, wrap);

        // Removing first only matters when add turns out to be a no-op.
        if registry.is_enabled(target) {
            prop_assert_eq!(direct, roundabout);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Inbound reconciliation is idempotent
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn inbound_reconcile_is_idempotent(
        registry in registry_strategy(),
        value in 0u8..5,
        initial in prop::option::of(0usize..14),
        wrap in any::<bool>(),
    ) {
        let value = format!("v{value}");
        let mut selection = SelectionState::new();
        selection.add(initial, &registry, wrap);

        for (index, action) in inbound_actions(&value, &registry, &selection, wrap) {
            selection.apply(Some(index), action, &registry, wrap);
        }
        prop_assert!(inbound_actions(&value, &registry, &selection, wrap).is_empty());

        match registry.position_of_value(&value) {
            Some(k) if registry.is_enabled(k) => {
                prop_assert_eq!(selection.selected(), &[k][..]);
            }
            None => prop_assert!(selection.selected().is_empty()),
            Some(_) => prop_assert!(selection.selected().len() <= 1),
        }
    }
}
