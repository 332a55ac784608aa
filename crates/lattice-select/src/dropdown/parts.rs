//! Sub-element handles.
//!
//! Each handle wraps a clone of its [`Dropdown`] and reads or mutates the
//! shared state through it. Handles are cheap to create and to clone.

use lattice_select_core::logging::targets;

use super::keyboard::{self, Key};
use super::Dropdown;
use crate::aria::{
    DisplayTextAttributes, DropdownRole, GroupAttributes, ItemAttributes, LabelAttributes,
    ListboxAttributes, TriggerAttributes,
};
use crate::geometry::{Rect, Size};
use crate::popover::PanelOutcome;

/// The element that opens and closes the panel.
#[derive(Debug, Clone)]
pub struct Trigger {
    dropdown: Dropdown,
}

impl Trigger {
    pub(super) fn new(dropdown: Dropdown) -> Self {
        Self { dropdown }
    }

    pub fn id(&self) -> &str {
        &self.dropdown.ids().trigger
    }

    /// Toggle the panel. Ignored when disabled or in hover mode.
    pub async fn click(&self) -> PanelOutcome {
        if self.dropdown.is_disabled() || self.dropdown.config().popover.hover {
            return PanelOutcome::Unchanged;
        }
        self.dropdown.toggle_open().await
    }

    /// Handle a key press. Returns whether the key was consumed.
    pub async fn key_down(&self, key: Key) -> bool {
        keyboard::handle(&self.dropdown, key).await
    }

    /// Open in hover mode.
    pub async fn pointer_enter(&self) -> PanelOutcome {
        if !self.dropdown.config().popover.hover {
            return PanelOutcome::Unchanged;
        }
        self.dropdown.open().await
    }

    /// Close in hover mode.
    pub fn pointer_leave(&self) -> PanelOutcome {
        if !self.dropdown.config().popover.hover {
            return PanelOutcome::Unchanged;
        }
        self.dropdown.close()
    }

    /// Record where the trigger is laid out.
    pub fn set_bounds(&self, bounds: Rect) {
        self.dropdown.popover().set_anchor_bounds(bounds);
    }

    pub fn attributes(&self) -> TriggerAttributes {
        let ids = self.dropdown.ids();
        TriggerAttributes {
            id: ids.trigger.clone(),
            expanded: self.dropdown.is_open(),
            controls: ids.listbox.clone(),
            active_descendant: self.dropdown.active_descendant(),
            labelled_by: self.dropdown.labelled_by().to_string(),
            disabled: self.dropdown.is_disabled(),
        }
    }
}

/// The panel's list of items.
#[derive(Debug, Clone)]
pub struct Listbox {
    dropdown: Dropdown,
}

impl Listbox {
    pub(super) fn new(dropdown: Dropdown) -> Self {
        Self { dropdown }
    }

    pub fn id(&self) -> &str {
        &self.dropdown.ids().listbox
    }

    /// Record where the panel is laid out.
    pub fn set_bounds(&self, bounds: Rect) {
        self.dropdown.popover().set_panel_bounds(bounds);
    }

    /// Place the panel next to the trigger.
    pub fn place(&self, size: Size, viewport: Option<Rect>) -> Option<Rect> {
        self.dropdown.place_panel(size, viewport)
    }

    pub fn items(&self) -> Vec<ListItem> {
        self.dropdown.items()
    }

    pub fn attributes(&self) -> ListboxAttributes {
        ListboxAttributes {
            id: self.dropdown.ids().listbox.clone(),
            role: DropdownRole::ListBox,
            open: self.dropdown.is_open(),
            labelled_by: self.dropdown.labelled_by().to_string(),
        }
    }
}

/// One selectable item.
#[derive(Debug, Clone)]
pub struct ListItem {
    dropdown: Dropdown,
    index: usize,
}

impl ListItem {
    pub(super) fn new(dropdown: Dropdown, index: usize) -> Self {
        Self { dropdown, index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn id(&self) -> String {
        self.dropdown.ids().item(self.index)
    }

    /// The display value.
    pub fn label(&self) -> &str {
        self.dropdown
            .registry()
            .get(self.index)
            .map(|item| item.display_value())
            .unwrap_or_default()
    }

    pub fn value(&self) -> &str {
        self.dropdown
            .registry()
            .get(self.index)
            .map(|item| item.value())
            .unwrap_or_default()
    }

    pub fn is_disabled(&self) -> bool {
        !self.dropdown.registry().is_enabled(self.index)
    }

    pub fn is_selected(&self) -> bool {
        !self.is_disabled() && self.dropdown.is_selected(self.index)
    }

    pub fn is_highlighted(&self) -> bool {
        self.dropdown.highlighted() == Some(self.index)
    }

    /// Select this item and close. Ignored when disabled.
    pub fn click(&self) -> bool {
        if self.is_disabled() {
            tracing::trace!(target: targets::DROPDOWN, index = self.index, "click on disabled item");
            return false;
        }
        self.dropdown.select(self.index);
        self.dropdown.close();
        true
    }

    /// Highlight this item. Ignored when disabled.
    pub fn pointer_over(&self) -> bool {
        self.dropdown.highlight(Some(self.index))
    }

    /// The indicator shown next to this item.
    pub fn indicator(&self) -> ItemIndicator {
        ItemIndicator { item: self.clone() }
    }

    pub fn attributes(&self) -> ItemAttributes {
        ItemAttributes {
            id: self.id(),
            role: DropdownRole::Option,
            selected: self.is_selected(),
            highlighted: self.is_highlighted(),
            disabled: self.is_disabled(),
        }
    }
}

/// Marker rendered next to a selected item.
#[derive(Debug, Clone)]
pub struct ItemIndicator {
    item: ListItem,
}

impl ItemIndicator {
    pub fn is_visible(&self) -> bool {
        self.item.is_selected()
    }
}

/// The dropdown's label.
#[derive(Debug, Clone)]
pub struct Label {
    dropdown: Dropdown,
}

impl Label {
    pub(super) fn new(dropdown: Dropdown) -> Self {
        Self { dropdown }
    }

    pub fn id(&self) -> &str {
        &self.dropdown.ids().label
    }

    /// Ask for the trigger to take focus. Ignored when disabled.
    pub fn click(&self) -> bool {
        if self.dropdown.is_disabled() {
            return false;
        }
        self.dropdown.focus_trigger_requested().emit(());
        true
    }

    pub fn attributes(&self) -> LabelAttributes {
        LabelAttributes {
            id: self.dropdown.ids().label.clone(),
            disabled: self.dropdown.is_disabled(),
        }
    }
}

/// A labelled group of items.
#[derive(Debug, Clone)]
pub struct Group {
    dropdown: Dropdown,
    index: usize,
}

impl Group {
    pub(super) fn new(dropdown: Dropdown, index: usize) -> Self {
        Self { dropdown, index }
    }

    /// Id the group's label element must carry.
    pub fn label_id(&self) -> String {
        self.dropdown.ids().group_label(self.index)
    }

    pub fn attributes(&self) -> GroupAttributes {
        GroupAttributes {
            role: DropdownRole::Group,
            labelled_by: self.label_id(),
        }
    }
}

/// Shows the selected value, or the placeholder.
#[derive(Debug, Clone)]
pub struct DisplayText {
    dropdown: Dropdown,
}

impl DisplayText {
    pub(super) fn new(dropdown: Dropdown) -> Self {
        Self { dropdown }
    }

    pub fn id(&self) -> &str {
        &self.dropdown.ids().value
    }

    pub fn text(&self) -> String {
        self.dropdown.display_text()
    }

    /// Whether nothing is selected.
    pub fn is_placeholder(&self) -> bool {
        self.dropdown.selected_index().is_none()
    }

    pub fn attributes(&self) -> DisplayTextAttributes {
        DisplayTextAttributes {
            id: self.dropdown.ids().value.clone(),
            open: self.dropdown.is_open(),
            placeholder_shown: self.is_placeholder(),
        }
    }
}
