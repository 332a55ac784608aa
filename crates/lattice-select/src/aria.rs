//! Accessibility surface: roles, element ids and attribute snapshots.
//!
//! Attribute values are derived from widget state only. Adapters turn the
//! snapshots into whatever their toolkit wants through
//! [`Attributes::to_pairs`], which yields HTML-style `(name, value)` pairs.

use crate::registry::ItemRegistry;

/// The accessibility role of a dropdown element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropdownRole {
    /// The widget root.
    ComboBox,
    /// The trigger.
    Button,
    /// The panel's item list.
    ListBox,
    /// A selectable item.
    Option,
    /// A group of items.
    Group,
    /// A label.
    Label,
}

impl DropdownRole {
    /// The ARIA role name.
    pub fn as_str(self) -> &'static str {
        match self {
            DropdownRole::ComboBox => "combobox",
            DropdownRole::Button => "button",
            DropdownRole::ListBox => "listbox",
            DropdownRole::Option => "option",
            DropdownRole::Group => "group",
            DropdownRole::Label => "label",
        }
    }

    /// Map to the AccessKit role.
    #[cfg(feature = "accessibility")]
    pub fn to_accesskit_role(self) -> accesskit::Role {
        use accesskit::Role;
        match self {
            DropdownRole::ComboBox => Role::ComboBox,
            DropdownRole::Button => Role::Button,
            DropdownRole::ListBox => Role::ListBox,
            DropdownRole::Option => Role::ListBoxOption,
            DropdownRole::Group => Role::Group,
            DropdownRole::Label => Role::Label,
        }
    }
}

#[cfg(feature = "accessibility")]
impl From<DropdownRole> for accesskit::Role {
    fn from(role: DropdownRole) -> Self {
        role.to_accesskit_role()
    }
}

/// Stable element ids derived from the root id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementIds {
    pub root: String,
    pub trigger: String,
    pub listbox: String,
    pub label: String,
    pub value: String,
    pub panel: String,
}

impl ElementIds {
    pub fn new(root: &str) -> Self {
        Self {
            root: root.to_string(),
            trigger: format!("{root}-trigger"),
            listbox: format!("{root}-listbox"),
            label: format!("{root}-label"),
            value: format!("{root}-value"),
            panel: format!("{root}-panel"),
        }
    }

    /// Id of the item at `index`, used for active-descendant tracking.
    pub fn item(&self, index: usize) -> String {
        format!("{}-{index}", self.root)
    }

    /// Id of the label of the group at `group`.
    pub fn group_label(&self, group: usize) -> String {
        if group == 0 {
            format!("{}-group-label", self.root)
        } else {
            format!("{}-group-{group}-label", self.root)
        }
    }
}

/// The id assistive technology should treat as focused.
///
/// `None` while closed, with nothing highlighted, or when the highlighted
/// item is disabled or gone.
pub fn active_descendant(
    ids: &ElementIds,
    open: bool,
    highlighted: Option<usize>,
    registry: &ItemRegistry,
) -> Option<String> {
    if !open {
        return None;
    }
    highlighted
        .filter(|&index| registry.is_enabled(index))
        .map(|index| ids.item(index))
}

/// An attribute snapshot.
pub trait Attributes {
    /// HTML-style `(name, value)` pairs. Boolean markers have empty values.
    fn to_pairs(&self) -> Vec<(&'static str, String)>;

    /// Look up one attribute by name.
    fn get(&self, name: &str) -> Option<String> {
        self.to_pairs()
            .into_iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    /// Whether the attribute is present.
    fn has(&self, name: &str) -> bool {
        self.to_pairs().iter().any(|(key, _)| *key == name)
    }
}

fn open_marker(open: bool) -> (&'static str, String) {
    if open {
        ("data-open", String::new())
    } else {
        ("data-closed", String::new())
    }
}

fn flag(name: &'static str, on: bool, pairs: &mut Vec<(&'static str, String)>) {
    if on {
        pairs.push((name, String::new()));
    }
}

/// Attributes of the widget root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootAttributes {
    pub id: String,
    pub role: DropdownRole,
    pub expanded: bool,
    pub controls: String,
    pub active_descendant: Option<String>,
    pub labelled_by: String,
}

impl Attributes for RootAttributes {
    fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("id", self.id.clone()),
            ("role", self.role.as_str().to_string()),
            ("aria-expanded", self.expanded.to_string()),
            ("aria-haspopup", "listbox".to_string()),
            ("aria-controls", self.controls.clone()),
            (
                "aria-activedescendant",
                self.active_descendant.clone().unwrap_or_default(),
            ),
            ("aria-labelledby", self.labelled_by.clone()),
            open_marker(self.expanded),
        ]
    }
}

/// Attributes of the trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerAttributes {
    pub id: String,
    pub expanded: bool,
    pub controls: String,
    pub active_descendant: Option<String>,
    pub labelled_by: String,
    pub disabled: bool,
}

impl Attributes for TriggerAttributes {
    fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("id", self.id.clone()),
            ("aria-expanded", self.expanded.to_string()),
            ("aria-haspopup", "listbox".to_string()),
            ("aria-controls", self.controls.clone()),
            (
                "aria-activedescendant",
                self.active_descendant.clone().unwrap_or_default(),
            ),
            ("aria-labelledby", self.labelled_by.clone()),
            open_marker(self.expanded),
        ];
        flag("disabled", self.disabled, &mut pairs);
        flag("data-disabled", self.disabled, &mut pairs);
        pairs
    }
}

/// Attributes of the listbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListboxAttributes {
    pub id: String,
    pub role: DropdownRole,
    pub open: bool,
    pub labelled_by: String,
}

impl Attributes for ListboxAttributes {
    fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("id", self.id.clone()),
            ("role", self.role.as_str().to_string()),
            ("aria-labelledby", self.labelled_by.clone()),
            ("tabindex", "-1".to_string()),
            open_marker(self.open),
        ]
    }
}

/// Attributes of one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemAttributes {
    pub id: String,
    pub role: DropdownRole,
    pub selected: bool,
    pub highlighted: bool,
    pub disabled: bool,
}

impl Attributes for ItemAttributes {
    fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("id", self.id.clone()),
            ("role", self.role.as_str().to_string()),
            ("tabindex", "-1".to_string()),
            ("aria-selected", self.selected.to_string()),
            ("aria-disabled", self.disabled.to_string()),
        ];
        flag("data-selected", self.selected, &mut pairs);
        flag("data-highlighted", self.highlighted, &mut pairs);
        flag("data-disabled", self.disabled, &mut pairs);
        pairs
    }
}

/// Attributes of the dropdown label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelAttributes {
    pub id: String,
    pub disabled: bool,
}

impl Attributes for LabelAttributes {
    fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("id", self.id.clone())];
        flag("data-disabled", self.disabled, &mut pairs);
        pairs
    }
}

/// Attributes of a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupAttributes {
    pub role: DropdownRole,
    pub labelled_by: String,
}

impl Attributes for GroupAttributes {
    fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("role", self.role.as_str().to_string()),
            ("aria-labelledby", self.labelled_by.clone()),
        ]
    }
}

/// Attributes of the display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayTextAttributes {
    pub id: String,
    pub open: bool,
    pub placeholder_shown: bool,
}

impl Attributes for DisplayTextAttributes {
    fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("id", self.id.clone()), open_marker(self.open)];
        flag("data-placeholder", self.placeholder_shown, &mut pairs);
        pairs
    }
}
