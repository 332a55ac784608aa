//! Declarative item trees.
//!
//! Hosts that describe a dropdown as a tree of nodes (labels, groups,
//! wrappers, items with nested labels) hand the tree to [`parse`], which
//! walks it once in document order and produces the same [`ItemRegistry`]
//! the builder API produces. Tree walking is confined to this module.

use crate::error::ConfigurationError;
use crate::registry::{ItemDescriptor, ItemRegistry, RegistryBuilder};

/// Content of an item label.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelContent {
    /// Plain text. The only accepted form.
    Text(String),
    /// Nested elements.
    Nodes(Vec<Node>),
    /// No content at all.
    Empty,
}

impl LabelContent {
    fn describe(&self) -> &'static str {
        match self {
            LabelContent::Text(_) => "text",
            LabelContent::Nodes(_) => "nested elements",
            LabelContent::Empty => "nothing",
        }
    }
}

/// A node in a dropdown declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// The dropdown's own label. Its presence switches `aria-labelledby`
    /// to the label id.
    Label(String),
    /// A selectable item.
    Item {
        value: Option<String>,
        disabled: bool,
        children: Vec<Node>,
    },
    /// The label of the enclosing item.
    ItemLabel(LabelContent),
    /// A group of items.
    Group(Vec<Node>),
    /// Any structural wrapper.
    Element(Vec<Node>),
    /// Free text, ignored.
    Text(String),
}

impl Node {
    /// An enabled item with no explicit value.
    pub fn item(children: Vec<Node>) -> Self {
        Node::Item {
            value: None,
            disabled: false,
            children,
        }
    }

    /// A plain-text item label.
    pub fn item_label(text: impl Into<String>) -> Self {
        Node::ItemLabel(LabelContent::Text(text.into()))
    }

    /// Shorthand for an item with just a text label.
    pub fn labelled_item(text: impl Into<String>) -> Self {
        Node::item(vec![Node::item_label(text)])
    }
}

/// Result of walking a declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub registry: ItemRegistry,
    /// Whether a [`Node::Label`] was declared anywhere in the tree.
    pub has_label: bool,
}

#[derive(Debug)]
struct PendingItem {
    index: usize,
    value: Option<String>,
    disabled: bool,
    label: Option<String>,
    label_count: usize,
}

#[derive(Default)]
struct Walker {
    builder: RegistryBuilder,
    has_label: bool,
}

impl Walker {
    fn visit(
        &mut self,
        node: &Node,
        item: &mut Option<PendingItem>,
    ) -> Result<(), ConfigurationError> {
        match node {
            Node::Label(_) => self.has_label = true,
            Node::Item {
                value,
                disabled,
                children,
            } => {
                if let Some(parent) = item {
                    return Err(ConfigurationError::NestedItem {
                        parent: parent.index,
                    });
                }
                let mut pending = Some(PendingItem {
                    index: self.builder.len(),
                    value: value.clone(),
                    disabled: *disabled,
                    label: None,
                    label_count: 0,
                });
                for child in children {
                    self.visit(child, &mut pending)?;
                }
                if let Some(pending) = pending {
                    self.finish(pending)?;
                }
            }
            Node::ItemLabel(content) => {
                let Some(pending) = item else {
                    let label = match content {
                        LabelContent::Text(text) => text.clone(),
                        other => other.describe().to_string(),
                    };
                    return Err(ConfigurationError::OrphanLabel { label });
                };
                let LabelContent::Text(text) = content else {
                    return Err(ConfigurationError::NonTextLabel {
                        index: pending.index,
                        found: content.describe(),
                    });
                };
                pending.label_count += 1;
                pending.label.get_or_insert_with(|| text.clone());
            }
            Node::Group(children) | Node::Element(children) => {
                for child in children {
                    self.visit(child, item)?;
                }
            }
            Node::Text(_) => {}
        }
        Ok(())
    }

    fn finish(&mut self, pending: PendingItem) -> Result<(), ConfigurationError> {
        let label = match (pending.label, pending.label_count) {
            (Some(label), 1) => label,
            (_, 0) => {
                return Err(ConfigurationError::MissingLabel {
                    index: pending.index,
                });
            }
            (_, count) => {
                return Err(ConfigurationError::MultipleLabels {
                    index: pending.index,
                    count,
                });
            }
        };
        self.builder.push(ItemDescriptor {
            label,
            value: pending.value,
            disabled: pending.disabled,
        });
        Ok(())
    }
}

/// Walk `nodes` and build the registry they declare.
pub fn parse(nodes: &[Node]) -> Result<Declaration, ConfigurationError> {
    let mut walker = Walker::default();
    let mut outside = None;
    for node in nodes {
        walker.visit(node, &mut outside)?;
    }
    Ok(Declaration {
        registry: walker.builder.build(),
        has_label: walker.has_label,
    })
}
