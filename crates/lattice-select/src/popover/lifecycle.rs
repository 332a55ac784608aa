use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use lattice_select_core::logging::{span_names, targets};
use lattice_select_core::runtime::{self, CancelFlag, TaskHandle, poll_until};
use lattice_select_core::{ConnectionGuard, RuntimeError, Signal};
use parking_lot::Mutex;
use tracing::Instrument;

use super::PopoverConfig;
use super::host::PanelHost;
use crate::error::PopoverError;
use crate::geometry::{Point, Rect, Size};

/// Visibility state of a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum PopoverState {
    #[default]
    Closed,
    /// A show is waiting for the capability to resolve.
    Opening,
    Open,
}

/// What a show or hide request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelOutcome {
    /// The panel became visible.
    Shown,
    /// The panel was hidden, or a pending show was cancelled.
    Hidden,
    /// Already in the requested state, or a show is already pending.
    Unchanged,
    /// A hide or teardown arrived while the show was waiting.
    Superseded,
    /// The fallback failed or never became ready; the panel stays closed.
    Degraded,
}

/// Snapshot of the lazily initialized capability state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PopoverRuntimeState {
    /// A show was requested at least once.
    pub interacted: bool,
    /// The host has been probed.
    pub capability_known: bool,
    pub native_supported: bool,
    pub fallback_loaded: bool,
    pub fallback_failed: bool,
}

/// Shared between the popover and its fallback loader task.
#[derive(Debug, Default)]
struct FallbackStatus {
    loaded: AtomicBool,
    failure: Mutex<Option<PopoverError>>,
}

impl FallbackStatus {
    fn mark_loaded(&self) {
        self.loaded.store(true, Ordering::Release);
    }

    fn mark_failed(&self, error: PopoverError) {
        *self.failure.lock() = Some(error);
    }

    fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    fn failure(&self) -> Option<PopoverError> {
        self.failure.lock().clone()
    }

    fn is_settled(&self) -> bool {
        self.is_loaded() || self.failure.lock().is_some()
    }
}

#[derive(Debug, Default)]
struct Bounds {
    anchor: Option<Rect>,
    panel: Option<Rect>,
}

/// Lifecycle engine for one floating panel.
///
/// # Signals
///
/// - `state_changed(PopoverState)`: emitted on every state transition
pub struct Popover {
    panel_id: String,
    host: Arc<dyn PanelHost>,
    config: PopoverConfig,
    state: Mutex<PopoverState>,
    runtime: Mutex<PopoverRuntimeState>,
    fallback: Arc<FallbackStatus>,
    loader: Mutex<Option<TaskHandle>>,
    cancel: CancelFlag,
    bounds: Mutex<Bounds>,
    dismiss: Mutex<Option<ConnectionGuard<Point>>>,

    /// Signal emitted when the state changes.
    pub state_changed: Signal<PopoverState>,
}

impl Popover {
    /// Create a closed popover for the panel with `panel_id`.
    pub fn new(panel_id: impl Into<String>, host: Arc<dyn PanelHost>, config: PopoverConfig) -> Self {
        Self {
            panel_id: panel_id.into(),
            host,
            config,
            state: Mutex::new(PopoverState::Closed),
            runtime: Mutex::new(PopoverRuntimeState::default()),
            fallback: Arc::new(FallbackStatus::default()),
            loader: Mutex::new(None),
            cancel: CancelFlag::new(),
            bounds: Mutex::new(Bounds::default()),
            dismiss: Mutex::new(None),
            state_changed: Signal::new(),
        }
    }

    pub fn panel_id(&self) -> &str {
        &self.panel_id
    }

    pub fn config(&self) -> &PopoverConfig {
        &self.config
    }

    pub fn state(&self) -> PopoverState {
        *self.state.lock()
    }

    pub fn is_open(&self) -> bool {
        self.state() == PopoverState::Open
    }

    /// Current capability state.
    pub fn runtime_state(&self) -> PopoverRuntimeState {
        let mut snapshot = *self.runtime.lock();
        snapshot.fallback_loaded = self.fallback.is_loaded();
        snapshot.fallback_failed = self.fallback.failure().is_some();
        snapshot
    }

    /// Show the panel.
    ///
    /// The first call probes the host. Without native support the call
    /// waits, bounded by the poll policy, for the fallback to become ready.
    pub async fn show(&self) -> PanelOutcome {
        if self.cancel.is_cancelled() {
            return PanelOutcome::Unchanged;
        }
        {
            let mut state = self.state.lock();
            if *state != PopoverState::Closed {
                return PanelOutcome::Unchanged;
            }
            *state = PopoverState::Opening;
        }
        self.state_changed.emit(PopoverState::Opening);

        let ready = self.ensure_capability().await;

        let mut state = self.state.lock();
        if *state != PopoverState::Opening {
            tracing::debug!(target: targets::POPOVER, panel = %self.panel_id, "show superseded");
            return PanelOutcome::Superseded;
        }
        if let Err(error) = ready {
            *state = PopoverState::Closed;
            drop(state);
            tracing::warn!(
                target: targets::POPOVER,
                panel = %self.panel_id,
                %error,
                "panel unavailable, staying closed"
            );
            self.state_changed.emit(PopoverState::Closed);
            return PanelOutcome::Degraded;
        }
        self.host.show_panel(&self.panel_id);
        *state = PopoverState::Open;
        drop(state);

        tracing::debug!(target: targets::POPOVER, panel = %self.panel_id, "panel shown");
        self.state_changed.emit(PopoverState::Open);
        PanelOutcome::Shown
    }

    /// Hide the panel. Never waits.
    ///
    /// A show still waiting on the capability is cancelled and resolves to
    /// [`PanelOutcome::Superseded`].
    pub fn hide(&self) -> PanelOutcome {
        self.disarm_dismiss();
        let mut state = self.state.lock();
        match *state {
            PopoverState::Closed => return PanelOutcome::Unchanged,
            PopoverState::Opening => {}
            PopoverState::Open => self.host.hide_panel(&self.panel_id),
        }
        *state = PopoverState::Closed;
        drop(state);

        tracing::debug!(target: targets::POPOVER, panel = %self.panel_id, "panel hidden");
        self.state_changed.emit(PopoverState::Closed);
        PanelOutcome::Hidden
    }

    /// Probe the host once, starting the fallback load when needed.
    /// Returns whether panels are native.
    fn probe(&self) -> bool {
        let mut runtime = self.runtime.lock();
        runtime.interacted = true;
        if runtime.capability_known {
            return runtime.native_supported;
        }
        runtime.capability_known = true;
        runtime.native_supported = self.host.supports_native_panels();
        tracing::debug!(
            target: targets::POPOVER,
            panel = %self.panel_id,
            native = runtime.native_supported,
            "capability probed"
        );
        if !runtime.native_supported {
            self.start_fallback_load();
        }
        runtime.native_supported
    }

    fn start_fallback_load(&self) {
        let load = self.host.load_fallback();
        let status = Arc::clone(&self.fallback);
        let panel_id = self.panel_id.clone();
        let task = runtime::spawn(async move {
            match load.await {
                Ok(()) => status.mark_loaded(),
                Err(error) => {
                    tracing::warn!(target: targets::POPOVER, panel = %panel_id, %error, "fallback load failed");
                    status.mark_failed(error);
                }
            }
        });
        match task {
            Ok(handle) => *self.loader.lock() = Some(handle),
            Err(_) => self.fallback.mark_failed(PopoverError::NoRuntime),
        }
    }

    async fn ensure_capability(&self) -> Result<(), PopoverError> {
        if self.probe() {
            return Ok(());
        }
        if let Some(error) = self.fallback.failure() {
            return Err(error);
        }

        let status = Arc::clone(&self.fallback);
        let span = tracing::debug_span!(
            target: targets::POPOVER,
            span_names::POLYFILL_WAIT,
            panel = %self.panel_id
        );
        let waited = poll_until(
            move || status.is_settled(),
            self.config.fallback_poll,
            &self.cancel,
        )
        .instrument(span)
        .await;

        match waited {
            Ok(_) => self.fallback.failure().map_or(Ok(()), Err),
            Err(RuntimeError::Exhausted { attempts }) => Err(PopoverError::NotReady { attempts }),
            Err(RuntimeError::Cancelled) => Err(PopoverError::Cancelled),
            Err(RuntimeError::NoRuntime) => Err(PopoverError::NoRuntime),
        }
    }

    /// Record the trigger's bounds.
    pub fn set_anchor_bounds(&self, bounds: Rect) {
        self.bounds.lock().anchor = Some(bounds);
    }

    /// Record the panel's bounds.
    pub fn set_panel_bounds(&self, bounds: Rect) {
        self.bounds.lock().panel = Some(bounds);
    }

    pub fn anchor_bounds(&self) -> Option<Rect> {
        self.bounds.lock().anchor
    }

    pub fn panel_bounds(&self) -> Option<Rect> {
        self.bounds.lock().panel
    }

    /// Whether `point` lies outside both the trigger and the panel.
    ///
    /// False while either bounds is unknown.
    pub fn is_outside(&self, point: Point) -> bool {
        let bounds = self.bounds.lock();
        match (bounds.anchor, bounds.panel) {
            (Some(anchor), Some(panel)) => anchor.is_outside(point) && panel.is_outside(point),
            _ => false,
        }
    }

    /// Compute and record the panel bounds from the floating options.
    ///
    /// `None` when floating is off or the anchor is unknown.
    pub fn place(&self, panel: Size, viewport: Option<Rect>) -> Option<Rect> {
        let floating = self.config.floating?;
        let mut bounds = self.bounds.lock();
        let rect = floating.compute(bounds.anchor?, panel, viewport);
        bounds.panel = Some(rect);
        Some(rect)
    }

    /// Hold the outside-dismiss listener while open.
    ///
    /// The guard is dropped at once if the panel is not open.
    pub fn arm_dismiss(&self, guard: ConnectionGuard<Point>) {
        if self.is_open() {
            *self.dismiss.lock() = Some(guard);
        }
    }

    /// Release the outside-dismiss listener.
    pub fn disarm_dismiss(&self) {
        let guard = self.dismiss.lock().take();
        drop(guard);
    }

    pub fn is_dismiss_armed(&self) -> bool {
        self.dismiss.lock().is_some()
    }

    /// Release everything the popover holds.
    ///
    /// Pending waits return without acting, the fallback load is aborted
    /// and later shows are refused. Idempotent.
    pub fn teardown(&self) {
        self.cancel.cancel();
        let loader = self.loader.lock().take();
        drop(loader);
        self.disarm_dismiss();

        let previous = std::mem::replace(&mut *self.state.lock(), PopoverState::Closed);
        if previous == PopoverState::Closed {
            return;
        }
        if previous == PopoverState::Open {
            self.host.hide_panel(&self.panel_id);
        }
        tracing::debug!(target: targets::POPOVER, panel = %self.panel_id, "torn down while shown");
        self.state_changed.emit(PopoverState::Closed);
    }
}

impl Drop for Popover {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for Popover {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Popover")
            .field("panel_id", &self.panel_id)
            .field("state", &self.state())
            .field("runtime", &self.runtime_state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use lattice_select_core::runtime::PollPolicy;

    use super::*;
    use crate::popover::host::{FallbackBehavior, HeadlessHost};

    fn fast_config() -> PopoverConfig {
        PopoverConfig::default().with_fallback_poll(PollPolicy::new(Duration::from_millis(1), 20))
    }

    #[tokio::test]
    async fn test_native_show_hide() {
        let host = Arc::new(HeadlessHost::native());
        let popover = Popover::new("p", host.clone(), fast_config());

        assert_eq!(popover.show().await, PanelOutcome::Shown);
        assert!(host.is_visible("p"));
        assert_eq!(popover.show().await, PanelOutcome::Unchanged);
        assert_eq!(popover.hide(), PanelOutcome::Hidden);
        assert!(!host.is_visible("p"));
        assert_eq!(popover.hide(), PanelOutcome::Unchanged);
    }

    #[tokio::test]
    async fn test_probe_runs_once() {
        let host = Arc::new(HeadlessHost::with_fallback(FallbackBehavior::Ready));
        let popover = Popover::new("p", host.clone(), fast_config());

        for _ in 0..3 {
            assert_eq!(popover.show().await, PanelOutcome::Shown);
            popover.hide();
        }
        assert_eq!(host.probe_count(), 1);
        assert_eq!(host.load_count(), 1);
        let runtime = popover.runtime_state();
        assert!(runtime.capability_known);
        assert!(!runtime.native_supported);
        assert!(runtime.fallback_loaded);
    }

    #[tokio::test]
    async fn test_delayed_fallback() {
        let host = Arc::new(HeadlessHost::with_fallback(FallbackBehavior::ReadyAfter(
            Duration::from_millis(3),
        )));
        let popover = Popover::new("p", host.clone(), fast_config());
        assert_eq!(popover.show().await, PanelOutcome::Shown);
        assert!(host.is_visible("p"));
    }

    #[tokio::test]
    async fn test_fallback_never_ready_degrades() {
        let host = Arc::new(HeadlessHost::with_fallback(FallbackBehavior::Never));
        let popover = Popover::new("p", host.clone(), fast_config());
        assert_eq!(popover.show().await, PanelOutcome::Degraded);
        assert_eq!(popover.state(), PopoverState::Closed);
        assert!(!host.is_visible("p"));
    }

    #[tokio::test]
    async fn test_fallback_failure_degrades() {
        let host = Arc::new(HeadlessHost::with_fallback(FallbackBehavior::Fail("no".into())));
        let popover = Popover::new("p", host.clone(), fast_config());
        assert_eq!(popover.show().await, PanelOutcome::Degraded);
        assert_eq!(popover.show().await, PanelOutcome::Degraded);
        assert!(popover.runtime_state().fallback_failed);
        assert_eq!(host.load_count(), 1);
    }

    #[tokio::test]
    async fn test_hide_while_opening() {
        let host = Arc::new(HeadlessHost::with_fallback(FallbackBehavior::ReadyAfter(
            Duration::from_millis(20),
        )));
        let popover = Arc::new(Popover::new(
            "p",
            host.clone(),
            PopoverConfig::default()
                .with_fallback_poll(PollPolicy::new(Duration::from_millis(1), 200)),
        ));

        let pending = {
            let popover = popover.clone();
            tokio::spawn(async move { popover.show().await })
        };
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(popover.state(), PopoverState::Opening);
        assert_eq!(popover.hide(), PanelOutcome::Hidden);

        assert_eq!(pending.await.unwrap(), PanelOutcome::Superseded);
        assert!(!host.is_visible("p"));
    }

    #[test]
    fn test_outside_needs_both_bounds() {
        let popover = Popover::new("p", Arc::new(HeadlessHost::native()), PopoverConfig::default());
        assert!(!popover.is_outside(Point::new(500.0, 500.0)));

        popover.set_anchor_bounds(Rect::from_edges(0.0, 0.0, 8.0, 8.0));
        popover.set_panel_bounds(Rect::from_edges(10.0, 10.0, 50.0, 50.0));
        assert!(popover.is_outside(Point::new(100.0, 100.0)));
        assert!(!popover.is_outside(Point::new(30.0, 30.0)));
        assert!(!popover.is_outside(Point::new(4.0, 4.0)));
    }

    #[test]
    fn test_place_records_panel_bounds() {
        let popover = Popover::new("p", Arc::new(HeadlessHost::native()), PopoverConfig::default());
        assert_eq!(popover.place(Size::new(10.0, 10.0), None), None);

        popover.set_anchor_bounds(Rect::new(0.0, 0.0, 20.0, 10.0));
        let rect = popover.place(Size::new(30.0, 40.0), None).unwrap();
        assert_eq!(rect, Rect::new(0.0, 10.0, 30.0, 40.0));
        assert_eq!(popover.panel_bounds(), Some(rect));
    }

    #[tokio::test]
    async fn test_dismiss_guard_only_while_open() {
        let pointer = Signal::<Point>::new();
        let popover = Popover::new("p", Arc::new(HeadlessHost::native()), PopoverConfig::default());

        popover.arm_dismiss(pointer.connect_scoped(|_| {}));
        assert_eq!(pointer.connection_count(), 0);

        popover.show().await;
        popover.arm_dismiss(pointer.connect_scoped(|_| {}));
        assert_eq!(pointer.connection_count(), 1);

        popover.hide();
        assert_eq!(pointer.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_teardown_hides_and_cancels() {
        let host = Arc::new(HeadlessHost::native());
        let popover = Popover::new("p", host.clone(), PopoverConfig::default());
        popover.show().await;

        let states = Arc::new(Mutex::new(Vec::new()));
        let seen = states.clone();
        popover.state_changed.connect(move |state| seen.lock().push(*state));

        popover.teardown();
        popover.teardown();
        assert!(!host.is_visible("p"));
        assert_eq!(popover.state(), PopoverState::Closed);
        assert_eq!(*states.lock(), vec![PopoverState::Closed]);

        assert_eq!(popover.show().await, PanelOutcome::Unchanged);
        assert!(!host.is_visible("p"));
    }
}
