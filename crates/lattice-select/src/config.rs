//! Dropdown configuration.
//!
//! Plain data with builder-style setters. Deserializes from partial
//! documents, so a host can keep dropdown settings in its own config file.
//!
//! ```
//! use lattice_select::config::SelectConfig;
//!
//! let config = SelectConfig::new()
//!     .with_id("fruit")
//!     .with_value("Pear")
//!     .with_placeholder("Pick a fruit")
//!     .with_loop(true);
//! assert!(config.looping);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::popover::PopoverConfig;

static NEXT_DROPDOWN_ID: AtomicU64 = AtomicU64::new(1);

/// Options for one dropdown.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectConfig {
    /// Base for every element id. Generated when absent.
    pub id: Option<String>,
    /// Initially selected value.
    pub value: Option<String>,
    /// Wrap around at either end while navigating.
    #[serde(rename = "loop")]
    pub looping: bool,
    /// Shown by the display text while nothing is selected.
    pub placeholder: Option<String>,
    /// Disable the whole widget.
    pub disabled: bool,
    pub popover: PopoverConfig,
}

impl SelectConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the id base.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the initial value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Enable or disable wrap-around navigation.
    pub fn with_loop(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Set the placeholder.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Enable or disable the widget.
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Set the popover options.
    pub fn with_popover(mut self, popover: PopoverConfig) -> Self {
        self.popover = popover;
        self
    }

    /// The configured id, or a fresh process-unique one.
    pub(crate) fn resolve_id(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => format!(
                "dropdown-{}",
                NEXT_DROPDOWN_ID.fetch_add(1, Ordering::Relaxed)
            ),
        }
    }
}
