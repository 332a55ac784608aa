//! The item registry: an ordered, frozen list of selectable items.
//!
//! Items get dense indices `0..N-1` in declaration order. The registry is
//! built once when a dropdown is constructed and never changes afterwards;
//! a different item list needs a fresh dropdown.
//!
//! # Example
//!
//! ```
//! use lattice_select::registry::{ItemDescriptor, ItemRegistry};
//!
//! let registry = ItemRegistry::builder()
//!     .item(ItemDescriptor::new("Apple"))
//!     .item(ItemDescriptor::new("Banana").with_value("banana").disabled())
//!     .build();
//!
//! assert_eq!(registry.len(), 2);
//! assert_eq!(registry.get(0).unwrap().value(), "Apple");
//! assert!(!registry.is_enabled(1));
//! ```

use serde::{Deserialize, Serialize};

/// Input describing one item.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemDescriptor {
    /// Text shown for the item.
    pub label: String,
    /// Explicit value. Defaults to the label when absent.
    #[serde(default)]
    pub value: Option<String>,
    /// Whether the item refuses selection and highlight.
    #[serde(default)]
    pub disabled: bool,
}

impl ItemDescriptor {
    /// Create an enabled item whose value is its label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: None,
            disabled: false,
        }
    }

    /// Set an explicit value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set the disabled flag.
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Mark the item disabled.
    pub fn disabled(self) -> Self {
        self.with_disabled(true)
    }
}

impl From<&str> for ItemDescriptor {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

/// A registered item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    index: usize,
    value: String,
    display_value: String,
    disabled: bool,
}

impl Item {
    /// Position in declaration order.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The value written to bindings and matched against external values.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The text shown for this item.
    pub fn display_value(&self) -> &str {
        &self.display_value
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}

/// Ordered index → item map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemRegistry {
    items: Vec<Item>,
}

impl ItemRegistry {
    /// Start building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Build a registry from descriptors in order.
    pub fn from_descriptors<I, D>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<ItemDescriptor>,
    {
        descriptors
            .into_iter()
            .fold(Self::builder(), |builder, d| builder.item(d))
            .build()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the item at `index`.
    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    /// Whether `index` names an existing, enabled item.
    pub fn is_enabled(&self, index: usize) -> bool {
        self.items.get(index).is_some_and(|item| !item.disabled)
    }

    /// Iterate items in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    /// Index of the first item whose value equals `value`.
    ///
    /// Values may repeat; later duplicates are never found.
    pub fn position_of_value(&self, value: &str) -> Option<usize> {
        self.items.iter().position(|item| item.value == value)
    }

    /// Number of enabled items.
    pub fn enabled_count(&self) -> usize {
        self.items.iter().filter(|item| !item.disabled).count()
    }
}

impl<'a> IntoIterator for &'a ItemRegistry {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Builder assigning sequential indices.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    items: Vec<Item>,
}

impl RegistryBuilder {
    /// Append an item.
    pub fn item(mut self, descriptor: impl Into<ItemDescriptor>) -> Self {
        self.push(descriptor.into());
        self
    }

    /// Append an item in place. Returns the assigned index.
    pub fn push(&mut self, descriptor: ItemDescriptor) -> usize {
        let index = self.items.len();
        let ItemDescriptor {
            label,
            value,
            disabled,
        } = descriptor;
        self.items.push(Item {
            index,
            value: value.unwrap_or_else(|| label.clone()),
            display_value: label,
            disabled,
        });
        index
    }

    /// Number of items added so far.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Freeze the registry.
    pub fn build(self) -> ItemRegistry {
        tracing::debug!(
            target: lattice_select_core::logging::targets::REGISTRY,
            items = self.items.len(),
            "registry built"
        );
        ItemRegistry { items: self.items }
    }
}
