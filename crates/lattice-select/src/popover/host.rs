//! The environment a popover presents its panel in.
//!
//! A [`PanelHost`] answers whether native top-layer panels exist, loads a
//! fallback implementation when they do not, and shows or hides a panel by
//! id. [`HeadlessHost`] keeps visibility in memory, for servers and tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt};
use parking_lot::Mutex;

use crate::error::PopoverError;

/// Host environment for floating panels.
pub trait PanelHost: Send + Sync {
    /// Whether panels can be shown natively. Asked once per popover.
    fn supports_native_panels(&self) -> bool;

    /// Load the fallback implementation.
    ///
    /// The returned future resolving `Ok` is the ready signal.
    fn load_fallback(&self) -> BoxFuture<'static, Result<(), PopoverError>>;

    /// Make the panel visible.
    fn show_panel(&self, panel_id: &str);

    /// Hide the panel.
    fn hide_panel(&self, panel_id: &str);
}

/// How a [`HeadlessHost`] answers fallback loads.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FallbackBehavior {
    /// Ready immediately.
    #[default]
    Ready,
    /// Ready after a delay.
    ReadyAfter(Duration),
    /// Loading fails with the message.
    Fail(String),
    /// Never becomes ready.
    Never,
}

/// In-memory panel host.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    native: bool,
    fallback: FallbackBehavior,
    visible: Mutex<Vec<String>>,
    probes: AtomicUsize,
    loads: AtomicUsize,
    shows: AtomicUsize,
}

impl HeadlessHost {
    /// A host with native panel support.
    pub fn native() -> Self {
        Self {
            native: true,
            ..Self::default()
        }
    }

    /// A host without native support whose fallback behaves as given.
    pub fn with_fallback(fallback: FallbackBehavior) -> Self {
        Self {
            native: false,
            fallback,
            ..Self::default()
        }
    }

    /// Whether `panel_id` is currently shown.
    pub fn is_visible(&self, panel_id: &str) -> bool {
        self.visible.lock().iter().any(|id| id == panel_id)
    }

    /// Number of capability probes answered.
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::Relaxed)
    }

    /// Number of fallback loads started.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    /// Number of times any panel was shown.
    pub fn show_count(&self) -> usize {
        self.shows.load(Ordering::Relaxed)
    }
}

impl PanelHost for HeadlessHost {
    fn supports_native_panels(&self) -> bool {
        self.probes.fetch_add(1, Ordering::Relaxed);
        self.native
    }

    fn load_fallback(&self) -> BoxFuture<'static, Result<(), PopoverError>> {
        self.loads.fetch_add(1, Ordering::Relaxed);
        match self.fallback.clone() {
            FallbackBehavior::Ready => futures_util::future::ready(Ok(())).boxed(),
            FallbackBehavior::ReadyAfter(delay) => async move {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            .boxed(),
            FallbackBehavior::Fail(message) => {
                futures_util::future::ready(Err(PopoverError::LoadFailed(message))).boxed()
            }
            FallbackBehavior::Never => {
                futures_util::future::pending::<Result<(), PopoverError>>().boxed()
            }
        }
    }

    fn show_panel(&self, panel_id: &str) {
        self.shows.fetch_add(1, Ordering::Relaxed);
        let mut visible = self.visible.lock();
        if !visible.iter().any(|id| id == panel_id) {
            visible.push(panel_id.to_string());
        }
    }

    fn hide_panel(&self, panel_id: &str) {
        self.visible.lock().retain(|id| id != panel_id);
    }
}
