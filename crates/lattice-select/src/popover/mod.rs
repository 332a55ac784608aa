//! Floating panel lifecycle.
//!
//! A [`Popover`] drives one panel through `Closed → Opening → Open` and back.
//! On first use it asks its [`PanelHost`] whether panels are supported
//! natively; when they are not it loads the host's fallback in the
//! background and waits for it with bounded polling. Once the capability is
//! resolved, showing and hiding no longer wait on anything.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use lattice_select::popover::{HeadlessHost, PanelOutcome, Popover, PopoverConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let host = Arc::new(HeadlessHost::native());
//! let popover = Popover::new("menu-panel", host.clone(), PopoverConfig::default());
//!
//! assert_eq!(popover.show().await, PanelOutcome::Shown);
//! assert!(host.is_visible("menu-panel"));
//! assert_eq!(popover.hide(), PanelOutcome::Hidden);
//! # }
//! ```

mod host;
mod lifecycle;
mod placement;

pub use host::{FallbackBehavior, HeadlessHost, PanelHost};
pub use lifecycle::{PanelOutcome, Popover, PopoverRuntimeState, PopoverState};
pub use placement::{FloatingOptions, Placement};

use lattice_select_core::runtime::PollPolicy;
use serde::{Deserialize, Serialize};

/// Popover options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopoverConfig {
    /// Placement relative to the trigger. `None` leaves positioning to the
    /// host.
    pub floating: Option<FloatingOptions>,
    /// Open on pointer-enter and close on pointer-leave instead of clicks.
    pub hover: bool,
    /// Readiness polling for the fallback implementation.
    pub fallback_poll: PollPolicy,
}

impl Default for PopoverConfig {
    fn default() -> Self {
        Self {
            floating: Some(FloatingOptions::default()),
            hover: false,
            fallback_poll: PollPolicy::default(),
        }
    }
}

impl PopoverConfig {
    /// Set the floating placement.
    pub fn with_floating(mut self, floating: FloatingOptions) -> Self {
        self.floating = Some(floating);
        self
    }

    /// Disable floating placement.
    pub fn without_floating(mut self) -> Self {
        self.floating = None;
        self
    }

    /// Enable or disable hover mode.
    pub fn with_hover(mut self, hover: bool) -> Self {
        self.hover = hover;
        self
    }

    /// Set the fallback readiness polling policy.
    pub fn with_fallback_poll(mut self, policy: PollPolicy) -> Self {
        self.fallback_poll = policy;
        self
    }
}
