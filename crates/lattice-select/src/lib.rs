//! lattice-select: a headless select/combobox widget.
//!
//! The crate provides the state machine behind a dropdown (trigger,
//! listbox, items, label, groups, display text and floating panel) without
//! drawing anything. Hosts feed it pointer and keyboard events and read
//! back state, signals and ARIA attribute snapshots.
//!
//! ## Modules
//!
//! - [`registry`] and [`declaration`]: the frozen item list, built directly
//!   or from a declaration tree
//! - [`navigation`]: enabled-item scanning with optional wrap-around
//! - [`selection`]: selected set and highlight
//! - [`popover`]: panel lifecycle, capability probe and fallback loading
//! - [`binding`]: sync with externally owned slots
//! - [`aria`]: roles, ids and attribute snapshots
//! - [`dropdown`]: the composite root and its sub-elements
//!
//! ## Example
//!
//! ```
//! use lattice_select::{Bindable, Dropdown, ItemDescriptor, SelectConfig};
//!
//! let value = Bindable::new(String::new());
//! let dropdown = Dropdown::builder()
//!     .with_items([ItemDescriptor::new("Oak"), ItemDescriptor::new("Pine")])
//!     .with_config(SelectConfig::new().with_placeholder("Choose a tree"))
//!     .with_value_binding(&value)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(dropdown.display_text(), "Choose a tree");
//! value.set("Pine".to_string());
//! assert_eq!(dropdown.selected_index(), Some(1));
//! ```

pub mod aria;
pub mod binding;
pub mod config;
pub mod declaration;
pub mod dropdown;
pub mod error;
pub mod geometry;
pub mod navigation;
pub mod popover;
pub mod registry;
pub mod selection;

pub use aria::{Attributes, DropdownRole, ElementIds};
pub use binding::ExternalBindings;
pub use config::SelectConfig;
pub use declaration::{LabelContent, Node};
pub use dropdown::{
    DisplayText, Dropdown, DropdownBuilder, DropdownEnvironment, Group, ItemIndicator, Key, Label,
    ListItem, Listbox, Trigger,
};
pub use error::{ConfigurationError, PopoverError, Result, SelectError};
pub use geometry::{Point, Rect, Size};
pub use popover::{
    FallbackBehavior, FloatingOptions, HeadlessHost, PanelHost, PanelOutcome, Placement, Popover,
    PopoverConfig, PopoverState,
};
pub use registry::{Item, ItemDescriptor, ItemRegistry};
pub use selection::{SelectionAction, SelectionProjection, SelectionState};

pub use lattice_select_core::{Bindable, Signal, WeakBindable};

static_assertions::assert_impl_all!(Dropdown: Send, Sync, Clone);
static_assertions::assert_impl_all!(Popover: Send, Sync);
