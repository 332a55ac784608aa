//! The composite dropdown.
//!
//! A [`Dropdown`] owns one shared state object: the item registry, the
//! selection, the open state, the popover and the binding reconciler.
//! Every sub-element ([`Trigger`], [`Listbox`], [`ListItem`], [`Label`],
//! [`Group`], [`DisplayText`], [`ItemIndicator`]) is a cheap handle onto that
//! state, so all of them always agree.
//!
//! # Example
//!
//! ```
//! use lattice_select::{Dropdown, ItemDescriptor, Key};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let dropdown = Dropdown::builder()
//!     .with_items([
//!         ItemDescriptor::new("A"),
//!         ItemDescriptor::new("B").disabled(),
//!         ItemDescriptor::new("C"),
//!     ])
//!     .build()
//!     .unwrap();
//!
//! let trigger = dropdown.trigger();
//! trigger.key_down(Key::ArrowDown).await;
//! trigger.key_down(Key::ArrowDown).await;
//! trigger.key_down(Key::Enter).await;
//!
//! assert_eq!(dropdown.selected_value().as_deref(), Some("C"));
//! assert!(!dropdown.is_open());
//! # }
//! ```
//!
//! # Signals
//!
//! - `selection_changed(SelectionProjection)`: after every selection change
//! - `open_changed(bool)`: when the open state flips
//! - `highlight_changed(Option<usize>)`: when the highlight moves
//! - `focus_trigger_requested(())`: the label was clicked

mod keyboard;
mod parts;

pub use keyboard::Key;
pub use parts::{DisplayText, Group, ItemIndicator, Label, ListItem, Listbox, Trigger};

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use lattice_select_core::logging::targets;
use lattice_select_core::runtime::{self, TaskHandle};
use lattice_select_core::{Bindable, ConnectionGuard, Memo, Property, Revision, Signal};
use parking_lot::Mutex;

use crate::aria::{self, DropdownRole, ElementIds, RootAttributes};
use crate::binding::{BindingReconciler, ExternalBindings, inbound_actions};
use crate::config::SelectConfig;
use crate::declaration::{self, Node};
use crate::error::Result;
use crate::geometry::{Point, Rect, Size};
use crate::navigation::{first_enabled, last_enabled, next_enabled, prev_enabled};
use crate::popover::{HeadlessHost, PanelHost, PanelOutcome, Popover};
use crate::registry::{ItemDescriptor, ItemRegistry};
use crate::selection::{SelectionAction, SelectionProjection, SelectionState};

/// What a dropdown needs from the surrounding application.
#[derive(Clone)]
pub struct DropdownEnvironment {
    /// Shows and hides the panel.
    pub host: Arc<dyn PanelHost>,
    /// Window-level pointer-down events, used for outside dismiss.
    pub pointer_down: Arc<Signal<Point>>,
}

impl DropdownEnvironment {
    /// Use `host` with a fresh pointer-down signal.
    pub fn new(host: Arc<dyn PanelHost>) -> Self {
        Self {
            host,
            pointer_down: Arc::new(Signal::new()),
        }
    }

    /// An in-memory host with native panel support.
    pub fn headless() -> Self {
        Self::new(Arc::new(HeadlessHost::native()))
    }

    /// Share an existing pointer-down signal.
    pub fn with_pointer_events(mut self, pointer_down: Arc<Signal<Point>>) -> Self {
        self.pointer_down = pointer_down;
        self
    }
}

impl fmt::Debug for DropdownEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropdownEnvironment")
            .field("pointer_listeners", &self.pointer_down.connection_count())
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct Observers {
    value: Option<ConnectionGuard<String>>,
    open: Option<ConnectionGuard<bool>>,
    /// Presents the panel after an open that did not await it.
    present: Option<TaskHandle>,
}

struct DropdownInner {
    ids: ElementIds,
    config: SelectConfig,
    registry: ItemRegistry,
    has_label: bool,
    selection: Mutex<SelectionState>,
    open: Property<bool>,
    revision: Revision,
    projection: Memo<SelectionProjection>,
    popover: Popover,
    bindings: BindingReconciler,
    pointer_down: Arc<Signal<Point>>,
    observers: Mutex<Observers>,
    torn_down: AtomicBool,

    selection_changed: Signal<SelectionProjection>,
    open_changed: Signal<bool>,
    highlight_changed: Signal<Option<usize>>,
    focus_trigger_requested: Signal<()>,
}

impl Drop for DropdownInner {
    fn drop(&mut self) {
        tracing::trace!(target: targets::DROPDOWN, id = %self.ids.root, "dropdown dropped");
        self.popover.teardown();
    }
}

/// Shared handle to a dropdown.
#[derive(Clone)]
pub struct Dropdown {
    inner: Arc<DropdownInner>,
}

impl Dropdown {
    /// Start building a dropdown.
    pub fn builder() -> DropdownBuilder {
        DropdownBuilder::default()
    }

    /// A dropdown over `items` with default options.
    pub fn new<I, D>(items: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<ItemDescriptor>,
    {
        DropdownBuilder::default()
            .with_registry(ItemRegistry::from_descriptors(items))
            .build_from_registry()
    }

    fn downgrade(&self) -> Weak<DropdownInner> {
        Arc::downgrade(&self.inner)
    }

    // =========================================================================
    // Identity and configuration
    // =========================================================================

    /// Root element id.
    pub fn id(&self) -> &str {
        &self.inner.ids.root
    }

    pub fn ids(&self) -> &ElementIds {
        &self.inner.ids
    }

    pub fn config(&self) -> &SelectConfig {
        &self.inner.config
    }

    pub fn registry(&self) -> &ItemRegistry {
        &self.inner.registry
    }

    /// Whether a label element was declared.
    pub fn has_label(&self) -> bool {
        self.inner.has_label
    }

    pub fn is_disabled(&self) -> bool {
        self.inner.config.disabled
    }

    /// The popover driving the panel.
    pub fn popover(&self) -> &Popover {
        &self.inner.popover
    }

    /// Bumped on every state change. Pull consumers compare it with the
    /// value they last rendered.
    pub fn revision(&self) -> u64 {
        self.inner.revision.current()
    }

    // =========================================================================
    // Signals
    // =========================================================================

    pub fn selection_changed(&self) -> &Signal<SelectionProjection> {
        &self.inner.selection_changed
    }

    pub fn open_changed(&self) -> &Signal<bool> {
        &self.inner.open_changed
    }

    pub fn highlight_changed(&self) -> &Signal<Option<usize>> {
        &self.inner.highlight_changed
    }

    /// Emitted when the label asks for the trigger to take focus.
    pub fn focus_trigger_requested(&self) -> &Signal<()> {
        &self.inner.focus_trigger_requested
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Selected indices in selection order.
    pub fn selected_indices(&self) -> Vec<usize> {
        self.inner.selection.lock().selected().to_vec()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.inner.selection.lock().first_selected()
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.inner.selection.lock().is_selected(index)
    }

    /// Values and display values of the selection, cached per revision.
    pub fn projection(&self) -> SelectionProjection {
        let inner = &self.inner;
        inner.projection.get(inner.revision.current(), || {
            inner.selection.lock().projection(&inner.registry)
        })
    }

    /// The value of the first selected item.
    pub fn selected_value(&self) -> Option<String> {
        self.projection().values.into_iter().next()
    }

    /// The first selected display value, else the placeholder, else empty.
    pub fn display_text(&self) -> String {
        self.projection()
            .display_values
            .into_iter()
            .next()
            .or_else(|| self.inner.config.placeholder.clone())
            .unwrap_or_default()
    }

    /// Apply a selection operation. Returns whether the selection changed.
    pub fn apply(&self, index: Option<usize>, action: SelectionAction) -> bool {
        let inner = &self.inner;
        let changed = inner.selection.lock().apply(
            index,
            action,
            &inner.registry,
            inner.config.looping,
        );
        if changed {
            self.notify_selection();
        }
        changed
    }

    /// Replace the selection with `index`.
    pub fn select(&self, index: usize) -> bool {
        self.apply(Some(index), SelectionAction::Add)
    }

    /// Flip membership of `index`.
    pub fn toggle(&self, index: usize) -> bool {
        self.apply(Some(index), SelectionAction::Toggle)
    }

    /// Remove `index` from the selection.
    pub fn deselect(&self, index: usize) -> bool {
        self.apply(Some(index), SelectionAction::Remove)
    }

    /// Select the first item whose value is `value`, or clear the
    /// selection when none matches.
    pub fn apply_external_value(&self, value: &str) -> bool {
        let inner = &self.inner;
        let changed = {
            let mut selection = inner.selection.lock();
            let actions =
                inbound_actions(value, &inner.registry, &selection, inner.config.looping);
            actions.into_iter().fold(false, |changed, (index, action)| {
                selection.apply(Some(index), action, &inner.registry, inner.config.looping) || changed
            })
        };
        if changed {
            tracing::debug!(target: targets::BINDING, value, "selection follows bound value");
            self.notify_selection();
        } else if inner.registry.position_of_value(value).is_none() && !value.is_empty() {
            tracing::debug!(target: targets::BINDING, value, "bound value matches no item");
        }
        changed
    }

    fn notify_selection(&self) {
        self.inner.revision.bump();
        let projection = self.projection();
        tracing::debug!(
            target: targets::SELECTION,
            id = %self.inner.ids.root,
            selected = ?projection.values,
            "selection changed"
        );
        self.inner.bindings.push_selection(&projection);
        self.inner.selection_changed.emit(projection);
    }

    // =========================================================================
    // Highlight
    // =========================================================================

    pub fn highlighted(&self) -> Option<usize> {
        self.inner.selection.lock().highlighted()
    }

    /// Move the highlight. Disabled or unknown indices are refused.
    pub fn highlight(&self, index: Option<usize>) -> bool {
        let changed = self
            .inner
            .selection
            .lock()
            .set_highlighted(index, &self.inner.registry);
        if changed {
            self.inner.revision.bump();
            self.inner.highlight_changed.emit(index);
        }
        changed
    }

    /// Highlight the next enabled item.
    pub fn highlight_next(&self) -> bool {
        let next = next_enabled(self.highlighted(), &self.inner.registry, self.inner.config.looping);
        self.highlight(next)
    }

    /// Highlight the previous enabled item.
    pub fn highlight_prev(&self) -> bool {
        let prev = prev_enabled(self.highlighted(), &self.inner.registry, self.inner.config.looping);
        self.highlight(prev)
    }

    pub fn highlight_first(&self) -> bool {
        self.highlight(first_enabled(&self.inner.registry))
    }

    pub fn highlight_last(&self) -> bool {
        self.highlight(last_enabled(&self.inner.registry))
    }

    /// Id of the element assistive technology should treat as focused.
    pub fn active_descendant(&self) -> Option<String> {
        aria::active_descendant(
            &self.inner.ids,
            self.is_open(),
            self.highlighted(),
            &self.inner.registry,
        )
    }

    // =========================================================================
    // Open state
    // =========================================================================

    pub fn is_open(&self) -> bool {
        self.inner.open.get()
    }

    /// Whether [`teardown`](Self::teardown) has run.
    pub fn is_torn_down(&self) -> bool {
        self.inner.torn_down.load(Ordering::Acquire)
    }

    /// Set the open state.
    ///
    /// Closing hides the panel at once. Opening presents the panel on a
    /// spawned task; without a Tokio runtime the dropdown closes again. A
    /// disabled or torn-down dropdown refuses to open. Returns whether the
    /// state changed.
    pub fn set_open(&self, open: bool) -> bool {
        let changed = self.update_open(open);
        if changed && open {
            self.schedule_present();
            return self.is_open();
        }
        changed
    }

    fn update_open(&self, open: bool) -> bool {
        if open && (self.is_disabled() || self.is_torn_down()) {
            return false;
        }
        if !self.inner.open.set(open) {
            return false;
        }
        self.inner.revision.bump();
        if !open {
            self.inner.popover.hide();
        }
        tracing::debug!(target: targets::DROPDOWN, id = %self.inner.ids.root, open, "open state changed");
        self.inner.bindings.push_open(open);
        self.inner.open_changed.emit(open);
        true
    }

    fn schedule_present(&self) {
        let weak = self.downgrade();
        let task = runtime::spawn(async move {
            if let Some(inner) = weak.upgrade() {
                Dropdown { inner }.present().await;
            }
        });
        match task {
            Ok(handle) => self.inner.observers.lock().present = Some(handle),
            Err(error) => {
                tracing::warn!(
                    target: targets::DROPDOWN,
                    id = %self.inner.ids.root,
                    %error,
                    "cannot present panel, closing"
                );
                self.update_open(false);
            }
        }
    }

    /// Bring the panel in line with the open state.
    ///
    /// When the panel cannot be shown the dropdown closes again and
    /// [`PanelOutcome::Degraded`] is returned.
    pub async fn present(&self) -> PanelOutcome {
        if self.is_torn_down() {
            return PanelOutcome::Unchanged;
        }
        if !self.is_open() {
            return self.inner.popover.hide();
        }
        let outcome = self.inner.popover.show().await;
        match outcome {
            PanelOutcome::Shown if !self.inner.config.popover.hover => self.arm_outside_dismiss(),
            PanelOutcome::Degraded => {
                self.update_open(false);
            }
            _ => {}
        }
        outcome
    }

    /// Open and present the panel.
    pub async fn open(&self) -> PanelOutcome {
        if self.is_disabled() || self.is_torn_down() {
            return PanelOutcome::Unchanged;
        }
        self.update_open(true);
        self.present().await
    }

    /// Close the panel.
    pub fn close(&self) -> PanelOutcome {
        if self.set_open(false) {
            PanelOutcome::Hidden
        } else {
            PanelOutcome::Unchanged
        }
    }

    /// Flip the open state and present the result.
    pub async fn toggle_open(&self) -> PanelOutcome {
        if self.is_open() {
            self.close()
        } else {
            self.open().await
        }
    }

    fn arm_outside_dismiss(&self) {
        let weak = self.downgrade();
        let guard = self.inner.pointer_down.connect_scoped(move |point: &Point| {
            if let Some(inner) = weak.upgrade() {
                Dropdown { inner }.dismiss_if_outside(*point);
            }
        });
        self.inner.popover.arm_dismiss(guard);
    }

    /// Close when `point` lies outside both the trigger and the panel.
    pub fn dismiss_if_outside(&self, point: Point) -> bool {
        if !self.is_open() || !self.inner.popover.is_outside(point) {
            return false;
        }
        tracing::debug!(target: targets::POPOVER, x = point.x, y = point.y, "pointer-down outside, closing");
        self.set_open(false)
    }

    /// Compute the panel rectangle from the floating options and the
    /// trigger bounds, recording it for outside-dismiss hit-testing.
    pub fn place_panel(&self, panel: Size, viewport: Option<Rect>) -> Option<Rect> {
        self.inner.popover.place(panel, viewport)
    }

    // =========================================================================
    // Bindings
    // =========================================================================

    fn connect_bindings(&self) {
        let mut observers = self.inner.observers.lock();

        if let Some(slot) = self.inner.bindings.value_slot() {
            let weak = self.downgrade();
            observers.value = Some(slot.on_change_scoped(move |value: &String| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                if inner.bindings.is_writing() {
                    return;
                }
                Dropdown { inner }.apply_external_value(value);
            }));
        }

        if let Some(slot) = self.inner.bindings.open_slot() {
            let weak = self.downgrade();
            observers.open = Some(slot.on_change_scoped(move |open: &bool| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                if inner.bindings.is_writing() {
                    return;
                }
                Dropdown { inner }.set_open(*open);
            }));
        }
    }

    // =========================================================================
    // Sub-elements
    // =========================================================================

    pub fn trigger(&self) -> Trigger {
        Trigger::new(self.clone())
    }

    pub fn listbox(&self) -> Listbox {
        Listbox::new(self.clone())
    }

    pub fn label(&self) -> Label {
        Label::new(self.clone())
    }

    /// The selected-value display.
    pub fn display(&self) -> DisplayText {
        DisplayText::new(self.clone())
    }

    /// The group with ordinal `index`.
    pub fn group(&self, index: usize) -> Group {
        Group::new(self.clone(), index)
    }

    /// The item at `index`.
    pub fn item(&self, index: usize) -> Option<ListItem> {
        (index < self.inner.registry.len()).then(|| ListItem::new(self.clone(), index))
    }

    /// All items in order.
    pub fn items(&self) -> Vec<ListItem> {
        (0..self.inner.registry.len())
            .map(|index| ListItem::new(self.clone(), index))
            .collect()
    }

    /// Id of the element naming the dropdown: the label when one was
    /// declared, otherwise the display text.
    pub fn labelled_by(&self) -> &str {
        if self.inner.has_label {
            &self.inner.ids.label
        } else {
            &self.inner.ids.value
        }
    }

    /// Root attribute snapshot.
    pub fn attributes(&self) -> RootAttributes {
        RootAttributes {
            id: self.inner.ids.root.clone(),
            role: DropdownRole::ComboBox,
            expanded: self.is_open(),
            controls: self.inner.ids.listbox.clone(),
            active_descendant: self.active_descendant(),
            labelled_by: self.labelled_by().to_string(),
        }
    }

    /// Release the panel and every listener, and close for good.
    ///
    /// Afterwards the dropdown refuses to open. Idempotent.
    pub fn teardown(&self) {
        let inner = &self.inner;
        if inner.torn_down.swap(true, Ordering::AcqRel) {
            return;
        }
        tracing::debug!(target: targets::DROPDOWN, id = %inner.ids.root, "teardown");
        inner.popover.teardown();
        self.update_open(false);
        let observers = std::mem::take(&mut *inner.observers.lock());
        drop(observers);
        inner.selection_changed.disconnect_all();
        inner.open_changed.disconnect_all();
        inner.highlight_changed.disconnect_all();
        inner.focus_trigger_requested.disconnect_all();
    }
}

impl fmt::Debug for Dropdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dropdown")
            .field("id", &self.inner.ids.root)
            .field("items", &self.inner.registry.len())
            .field("selected", &self.selected_indices())
            .field("highlighted", &self.highlighted())
            .field("open", &self.is_open())
            .finish()
    }
}

enum ItemSource {
    Registry(ItemRegistry),
    Declaration(Vec<Node>),
}

impl Default for ItemSource {
    fn default() -> Self {
        ItemSource::Registry(ItemRegistry::default())
    }
}

/// Builder for [`Dropdown`].
#[derive(Default)]
pub struct DropdownBuilder {
    source: ItemSource,
    has_label: bool,
    config: SelectConfig,
    bindings: ExternalBindings,
    environment: Option<DropdownEnvironment>,
}

impl DropdownBuilder {
    /// Use `items` in order.
    pub fn with_items<I, D>(self, items: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<ItemDescriptor>,
    {
        self.with_registry(ItemRegistry::from_descriptors(items))
    }

    /// Use a prebuilt registry.
    pub fn with_registry(mut self, registry: ItemRegistry) -> Self {
        self.source = ItemSource::Registry(registry);
        self
    }

    /// Walk a declaration tree for the items and the label.
    pub fn with_declaration(mut self, nodes: Vec<Node>) -> Self {
        self.source = ItemSource::Declaration(nodes);
        self
    }

    /// Declare that a label element names the dropdown.
    pub fn with_label(mut self, has_label: bool) -> Self {
        self.has_label = has_label;
        self
    }

    pub fn with_config(mut self, config: SelectConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_bindings(mut self, bindings: ExternalBindings) -> Self {
        self.bindings = bindings;
        self
    }

    /// Bind the selected value to `slot`.
    pub fn with_value_binding(mut self, slot: &Bindable<String>) -> Self {
        self.bindings = self.bindings.with_value(slot);
        self
    }

    /// Bind the open state to `slot`.
    pub fn with_open_binding(mut self, slot: &Bindable<bool>) -> Self {
        self.bindings = self.bindings.with_open(slot);
        self
    }

    /// Bind the display text to `slot`.
    pub fn with_display_text_binding(mut self, slot: &Bindable<String>) -> Self {
        self.bindings = self.bindings.with_display_text(slot);
        self
    }

    pub fn with_environment(mut self, environment: DropdownEnvironment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Build the dropdown.
    ///
    /// Fails only when a declaration tree is malformed.
    pub fn build(mut self) -> Result<Dropdown> {
        if let ItemSource::Declaration(nodes) = &self.source {
            let parsed = declaration::parse(nodes)?;
            self.has_label |= parsed.has_label;
            self.source = ItemSource::Registry(parsed.registry);
        }
        Ok(self.build_from_registry())
    }

    fn build_from_registry(self) -> Dropdown {
        let registry = match self.source {
            ItemSource::Registry(registry) => registry,
            ItemSource::Declaration(_) => ItemRegistry::default(),
        };
        let config = self.config;
        let environment = self.environment.unwrap_or_else(DropdownEnvironment::headless);
        let ids = ElementIds::new(&config.resolve_id());

        let mut selection = SelectionState::new();
        if let Some(value) = config.value.as_deref() {
            match registry.position_of_value(value) {
                Some(index) => {
                    selection.add(Some(index), &registry, config.looping);
                    selection.set_highlighted(Some(index), &registry);
                }
                None => {
                    tracing::debug!(target: targets::DROPDOWN, value, "initial value matches no item");
                }
            }
        }

        let popover = Popover::new(
            ids.panel.clone(),
            Arc::clone(&environment.host),
            config.popover.clone(),
        );

        let dropdown = Dropdown {
            inner: Arc::new(DropdownInner {
                ids,
                registry,
                has_label: self.has_label,
                selection: Mutex::new(selection),
                open: Property::new(false),
                revision: Revision::new(),
                projection: Memo::new(),
                popover,
                bindings: BindingReconciler::new(self.bindings),
                pointer_down: environment.pointer_down,
                observers: Mutex::new(Observers::default()),
                torn_down: AtomicBool::new(false),
                selection_changed: Signal::new(),
                open_changed: Signal::new(),
                highlight_changed: Signal::new(),
                focus_trigger_requested: Signal::new(),
                config,
            }),
        };

        dropdown.connect_bindings();
        let bound_value = dropdown
            .inner
            .bindings
            .value_slot()
            .map(|slot| slot.get())
            .filter(|value| !value.is_empty());
        let followed = bound_value.is_some_and(|value| dropdown.apply_external_value(&value));
        if followed {
            let selected = dropdown.selected_index();
            let inner = &dropdown.inner;
            // The bound value overrides the configured one, highlight included
            inner.selection.lock().set_highlighted(selected, &inner.registry);
        } else {
            dropdown.inner.bindings.push_selection(&dropdown.projection());
        }
        dropdown.inner.bindings.push_open(false);

        tracing::debug!(
            target: targets::DROPDOWN,
            id = %dropdown.inner.ids.root,
            items = dropdown.inner.registry.len(),
            "dropdown created"
        );
        dropdown
    }
}
