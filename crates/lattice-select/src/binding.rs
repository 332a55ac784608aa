//! Two-way sync between a dropdown and externally owned slots.
//!
//! The owner of a form or page can hand a dropdown [`Bindable`] slots for
//! the selected value, the open state and the display text. The dropdown
//! holds them weakly: it reads and writes them but never keeps them alive.
//!
//! Writes going out are flagged while they happen, so the change
//! notification they trigger is recognized as an echo and not fed back
//! into the selection.

use std::sync::atomic::{AtomicBool, Ordering};

use lattice_select_core::logging::{span_names, targets};
use lattice_select_core::{Bindable, WeakBindable};

use crate::navigation::enabled_or_next;
use crate::registry::ItemRegistry;
use crate::selection::{SelectionAction, SelectionProjection, SelectionState};

const VALUE_SLOT: &str = "value";
const OPEN_SLOT: &str = "open";
const DISPLAY_TEXT_SLOT: &str = "display_text";

/// Optional externally owned slots.
#[derive(Debug, Clone, Default)]
pub struct ExternalBindings {
    value: Option<WeakBindable<String>>,
    open: Option<WeakBindable<bool>>,
    display_text: Option<WeakBindable<String>>,
}

impl ExternalBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the selected value.
    pub fn with_value(mut self, slot: &Bindable<String>) -> Self {
        self.value = Some(slot.downgrade());
        self
    }

    /// Bind the open state.
    pub fn with_open(mut self, slot: &Bindable<bool>) -> Self {
        self.open = Some(slot.downgrade());
        self
    }

    /// Bind the display text. Written only.
    pub fn with_display_text(mut self, slot: &Bindable<String>) -> Self {
        self.display_text = Some(slot.downgrade());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.open.is_none() && self.display_text.is_none()
    }
}

/// Resets the writing flag to its previous value on drop.
struct WritingGuard<'a> {
    flag: &'a AtomicBool,
    previous: bool,
}

impl<'a> WritingGuard<'a> {
    fn new(flag: &'a AtomicBool) -> Self {
        let previous = flag.swap(true, Ordering::AcqRel);
        Self { flag, previous }
    }
}

impl Drop for WritingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(self.previous, Ordering::Release);
    }
}

/// Mirrors internal state outward and recognizes echoes.
#[derive(Debug, Default)]
pub struct BindingReconciler {
    bindings: ExternalBindings,
    writing: AtomicBool,
}

impl BindingReconciler {
    pub fn new(bindings: ExternalBindings) -> Self {
        Self {
            bindings,
            writing: AtomicBool::new(false),
        }
    }

    /// Whether an outward write is in progress. Change notifications
    /// arriving now are echoes.
    pub fn is_writing(&self) -> bool {
        self.writing.load(Ordering::Acquire)
    }

    /// The live value slot, if bound.
    pub fn value_slot(&self) -> Option<Bindable<String>> {
        upgrade(&self.bindings.value, VALUE_SLOT)
    }

    /// The live open slot, if bound.
    pub fn open_slot(&self) -> Option<Bindable<bool>> {
        upgrade(&self.bindings.open, OPEN_SLOT)
    }

    /// Mirror the selection outward.
    ///
    /// The value slot is overwritten only when it differs from the first
    /// selected value and something is selected. The display text always
    /// receives the first display value, or an empty string. Returns
    /// whether any slot changed.
    pub fn push_selection(&self, projection: &SelectionProjection) -> bool {
        let _span = tracing::debug_span!(target: targets::BINDING, span_names::RECONCILE).entered();
        let _writing = WritingGuard::new(&self.writing);
        let mut changed = false;

        if let (Some(first), Some(slot)) = (projection.first_value(), self.value_slot())
            && slot.with(|current| current != first)
        {
            tracing::debug!(target: targets::BINDING, value = first, "writing bound value");
            changed |= slot.set(first.to_string());
        }

        if let Some(slot) = upgrade(&self.bindings.display_text, DISPLAY_TEXT_SLOT) {
            let text = projection.first_display_value().unwrap_or_default();
            changed |= slot.set(text.to_string());
        }
        changed
    }

    /// Mirror the open state outward.
    pub fn push_open(&self, open: bool) -> bool {
        let _writing = WritingGuard::new(&self.writing);
        self.open_slot().is_some_and(|slot| slot.set(open))
    }
}

fn upgrade<T>(slot: &Option<WeakBindable<T>>, name: &'static str) -> Option<Bindable<T>> {
    let weak = slot.as_ref()?;
    match weak.try_upgrade(name) {
        Ok(slot) => Some(slot),
        Err(error) => {
            tracing::debug!(target: targets::BINDING, %error, "ignoring bound slot");
            None
        }
    }
}

/// The selection operations that make the selection match `external`.
///
/// Walks the registry in order: the first item whose value equals
/// `external` is added, every other selected item is removed. A disabled
/// match stands for the enabled item `add` redirects it to. Empty when the
/// selection already matches.
pub fn inbound_actions(
    external: &str,
    registry: &ItemRegistry,
    selection: &SelectionState,
    wrap: bool,
) -> Vec<(usize, SelectionAction)> {
    let target = registry
        .position_of_value(external)
        .and_then(|matched| enabled_or_next(matched, registry, wrap));
    let already = target.is_some_and(|t| selection.selected() == [t]);

    registry
        .iter()
        .filter_map(|item| {
            let index = item.index();
            if Some(index) == target {
                (!already).then_some((index, SelectionAction::Add))
            } else {
                selection
                    .is_selected(index)
                    .then_some((index, SelectionAction::Remove))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ItemDescriptor;

    fn abc() -> ItemRegistry {
        ItemRegistry::from_descriptors([
            ItemDescriptor::new("A"),
            ItemDescriptor::new("B").disabled(),
            ItemDescriptor::new("C"),
        ])
    }

    fn apply(
        actions: &[(usize, SelectionAction)],
        selection: &mut SelectionState,
        registry: &ItemRegistry,
    ) {
        for &(index, action) in actions {
            selection.apply(Some(index), action, registry, false);
        }
    }

    #[test]
    fn test_inbound_match_is_idempotent() {
        let registry = abc();
        let mut selection = SelectionState::new();
        selection.add(Some(0), &registry, false);

        let actions = inbound_actions("C", &registry, &selection, false);
        apply(&actions, &mut selection, &registry);
        assert_eq!(selection.selected(), &[2]);

        assert!(inbound_actions("C", &registry, &selection, false).is_empty());
    }

    #[test]
    fn test_inbound_no_match_clears() {
        let registry = abc();
        let mut selection = SelectionState::new();
        selection.add(Some(2), &registry, false);

        let actions = inbound_actions("zzz", &registry, &selection, false);
        assert_eq!(actions, vec![(2, SelectionAction::Remove)]);
        apply(&actions, &mut selection, &registry);
        assert!(selection.selected().is_empty());
    }

    #[test]
    fn test_inbound_disabled_match_is_stable() {
        let registry = abc();
        let mut selection = SelectionState::new();
        let actions = inbound_actions("B", &registry, &selection, false);
        assert_eq!(actions, vec![(2, SelectionAction::Add)]);
        apply(&actions, &mut selection, &registry);
        assert_eq!(selection.selected(), &[2]);
        assert!(inbound_actions("B", &registry, &selection, false).is_empty());
    }

    #[test]
    fn test_inbound_exact_match_only() {
        let registry = ItemRegistry::from_descriptors([ItemDescriptor::new("Apple")]);
        let selection = SelectionState::new();
        assert!(inbound_actions("App", &registry, &selection, false).is_empty());
    }

    #[test]
    fn test_push_selection_writes_slots() {
        let value = Bindable::new(String::new());
        let text = Bindable::new("stale".to_string());
        let reconciler = BindingReconciler::new(
            ExternalBindings::new()
                .with_value(&value)
                .with_display_text(&text),
        );

        let projection = SelectionProjection {
            values: vec!["c".into()],
            display_values: vec!["C".into()],
        };
        assert!(reconciler.push_selection(&projection));
        assert_eq!(value.get(), "c");
        assert_eq!(text.get(), "C");
        assert!(!reconciler.push_selection(&projection));

        assert!(reconciler.push_selection(&SelectionProjection::default()));
        assert_eq!(value.get(), "c");
        assert_eq!(text.get(), "");
    }

    #[test]
    fn test_writes_are_flagged() {
        let value = Bindable::new(String::new());
        let reconciler = std::sync::Arc::new(BindingReconciler::new(
            ExternalBindings::new().with_value(&value),
        ));

        let seen = std::sync::Arc::new(AtomicBool::new(false));
        {
            let reconciler = reconciler.clone();
            let seen = seen.clone();
            value.on_change(move |_| seen.store(reconciler.is_writing(), Ordering::SeqCst));
        }

        reconciler.push_selection(&SelectionProjection {
            values: vec!["x".into()],
            display_values: vec!["X".into()],
        });
        assert!(seen.load(Ordering::SeqCst));
        assert!(!reconciler.is_writing());
    }

    #[test]
    fn test_dropped_slot_ignored() {
        let reconciler = {
            let open = Bindable::new(false);
            BindingReconciler::new(ExternalBindings::new().with_open(&open))
        };
        assert!(!reconciler.push_open(true));
        assert!(reconciler.open_slot().is_none());
    }
}
