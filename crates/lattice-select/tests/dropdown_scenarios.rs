//! End-to-end dropdown scenarios driven through the public API.
//!
//! Each test builds a dropdown on a headless host and plays user input
//! (keys, clicks, window pointer-downs) or external binding writes against
//! it, then checks the observable state.
//!
//! Set `RUST_LOG=lattice_select=debug` to see the event trail.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use lattice_select::{
    Bindable, Dropdown, DropdownEnvironment, FallbackBehavior, HeadlessHost, ItemDescriptor, Key,
    PanelOutcome, Point, PopoverConfig, Rect, SelectConfig, Signal,
};
use lattice_select_core::runtime::PollPolicy;

// ── Helpers ─────────────────────────────────────────────────────────────

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A, B (disabled), C
fn abc() -> Vec<ItemDescriptor> {
    vec![
        ItemDescriptor::new("A"),
        ItemDescriptor::new("B").disabled(),
        ItemDescriptor::new("C"),
    ]
}

fn fast_poll() -> PopoverConfig {
    PopoverConfig::default().with_fallback_poll(PollPolicy::new(Duration::from_millis(1), 20))
}

// ═════════════════════════════════════════════════════════════════════════
// Keyboard
// ═════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn arrow_keys_skip_disabled_and_enter_selects() {
    init_tracing();
    let dropdown = Dropdown::builder()
        .with_items(abc())
        .with_config(SelectConfig::new().with_id("fruit"))
        .build()
        .unwrap();
    let trigger = dropdown.trigger();

    assert!(trigger.key_down(Key::ArrowDown).await);
    assert_eq!(dropdown.highlighted(), Some(0));
    assert!(dropdown.is_open());
    assert_eq!(dropdown.active_descendant().as_deref(), Some("fruit-0"));

    assert!(trigger.key_down(Key::ArrowDown).await);
    assert_eq!(dropdown.highlighted(), Some(2));

    assert!(trigger.key_down(Key::Enter).await);
    assert_eq!(dropdown.selected_indices(), vec![2]);
    assert_eq!(dropdown.display_text(), "C");
    assert!(!dropdown.is_open());
    assert_eq!(dropdown.active_descendant(), None);
}

#[tokio::test]
async fn looping_wraps_and_escape_closes() {
    let dropdown = Dropdown::builder()
        .with_items(abc())
        .with_config(SelectConfig::new().with_loop(true))
        .build()
        .unwrap();
    let trigger = dropdown.trigger();

    trigger.key_down(Key::End).await;
    assert_eq!(dropdown.highlighted(), Some(2));
    assert!(dropdown.is_open());

    trigger.key_down(Key::ArrowDown).await;
    assert_eq!(dropdown.highlighted(), Some(0));
    trigger.key_down(Key::ArrowUp).await;
    assert_eq!(dropdown.highlighted(), Some(2));

    assert!(trigger.key_down(Key::Escape).await);
    assert!(!dropdown.is_open());
    assert!(dropdown.selected_indices().is_empty());
}

#[tokio::test]
async fn tab_closes_without_consuming() {
    let dropdown = Dropdown::new(abc());
    dropdown.open().await;
    assert!(!dropdown.trigger().key_down(Key::Tab).await);
    assert!(!dropdown.is_open());
}

// ═════════════════════════════════════════════════════════════════════════
// Outside dismiss
// ═════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn pointer_down_outside_closes() {
    init_tracing();
    let pointer = Arc::new(Signal::<Point>::new());
    let dropdown = Dropdown::builder()
        .with_items(abc())
        .with_environment(DropdownEnvironment::headless().with_pointer_events(pointer.clone()))
        .build()
        .unwrap();

    dropdown.trigger().set_bounds(Rect::from_edges(0.0, 0.0, 8.0, 8.0));
    dropdown
        .listbox()
        .set_bounds(Rect::from_edges(10.0, 10.0, 50.0, 50.0));

    assert_eq!(dropdown.open().await, PanelOutcome::Shown);
    assert_eq!(pointer.connection_count(), 1);

    pointer.emit(Point::new(30.0, 30.0));
    assert!(dropdown.is_open());
    pointer.emit(Point::new(4.0, 4.0));
    assert!(dropdown.is_open());

    pointer.emit(Point::new(100.0, 100.0));
    assert!(!dropdown.is_open());
    assert_eq!(pointer.connection_count(), 0);
}

#[tokio::test]
async fn placed_panel_counts_as_inside() {
    let pointer = Arc::new(Signal::<Point>::new());
    let dropdown = Dropdown::builder()
        .with_items(abc())
        .with_environment(DropdownEnvironment::headless().with_pointer_events(pointer.clone()))
        .build()
        .unwrap();

    dropdown.trigger().set_bounds(Rect::new(0.0, 0.0, 100.0, 20.0));
    let panel = dropdown
        .listbox()
        .place(lattice_select::Size::new(100.0, 60.0), None)
        .unwrap();
    assert_eq!(panel.top(), 20.0);

    dropdown.open().await;
    pointer.emit(Point::new(50.0, 50.0));
    assert!(dropdown.is_open());
    pointer.emit(Point::new(50.0, 200.0));
    assert!(!dropdown.is_open());
}

// ═════════════════════════════════════════════════════════════════════════
// Bindings
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn external_value_selects_first_match_once() {
    let value = Bindable::new(String::new());
    let writes = Arc::new(AtomicUsize::new(0));
    {
        let writes = writes.clone();
        value.on_change(move |_| {
            writes.fetch_add(1, Ordering::SeqCst);
        });
    }
    let dropdown = Dropdown::builder()
        .with_items(abc())
        .with_value_binding(&value)
        .build()
        .unwrap();
    let selections = Arc::new(AtomicUsize::new(0));
    {
        let selections = selections.clone();
        dropdown.selection_changed().connect(move |_| {
            selections.fetch_add(1, Ordering::SeqCst);
        });
    }

    value.set("C".to_string());
    assert_eq!(dropdown.selected_indices(), vec![2]);
    assert_eq!(selections.load(Ordering::SeqCst), 1);
    // The echo did not rewrite the slot
    assert_eq!(writes.load(Ordering::SeqCst), 1);

    value.set("nothing".to_string());
    assert!(dropdown.selected_indices().is_empty());

    dropdown.select(0);
    assert_eq!(value.get(), "A");
}

#[test]
fn bound_value_wins_over_configured_value() {
    let value = Bindable::new("C".to_string());
    let dropdown = Dropdown::builder()
        .with_items(abc())
        .with_config(SelectConfig::new().with_value("A"))
        .with_value_binding(&value)
        .build()
        .unwrap();
    assert_eq!(dropdown.selected_indices(), vec![2]);
    assert_eq!(dropdown.highlighted(), Some(2));
    assert_eq!(value.get(), "C");
}

#[test]
fn empty_bound_value_takes_configured_value() {
    let value = Bindable::new(String::new());
    let dropdown = Dropdown::builder()
        .with_items(abc())
        .with_config(SelectConfig::new().with_value("A"))
        .with_value_binding(&value)
        .build()
        .unwrap();
    assert_eq!(dropdown.selected_indices(), vec![0]);
    assert_eq!(value.get(), "A");
}

#[test]
fn display_text_binding_tracks_selection() {
    let text = Bindable::new("stale".to_string());
    let dropdown = Dropdown::builder()
        .with_items([
            ItemDescriptor::new("Oak").with_value("oak"),
            ItemDescriptor::new("Pine").with_value("pine"),
        ])
        .with_config(SelectConfig::new().with_placeholder("Choose"))
        .with_display_text_binding(&text)
        .build()
        .unwrap();
    assert_eq!(text.get(), "");
    assert_eq!(dropdown.display_text(), "Choose");

    dropdown.select(1);
    assert_eq!(text.get(), "Pine");
    assert_eq!(dropdown.selected_value().as_deref(), Some("pine"));

    dropdown.deselect(1);
    assert_eq!(text.get(), "");
}

#[tokio::test]
async fn open_binding_follows_both_ways() {
    let host = Arc::new(HeadlessHost::native());
    let open = Bindable::new(true);
    let dropdown = Dropdown::builder()
        .with_items(abc())
        .with_open_binding(&open)
        .with_environment(DropdownEnvironment::new(host.clone()))
        .build()
        .unwrap();
    assert!(!open.get());

    // An external open shows the panel without anyone awaiting it
    open.set(true);
    assert!(dropdown.is_open());
    for _ in 0..3 {
        tokio::task::yield_now().await;
    }
    assert!(host.is_visible(dropdown.popover().panel_id()));
    assert!(dropdown.popover().is_dismiss_armed());

    open.set(false);
    assert!(!dropdown.is_open());
    assert!(!host.is_visible(dropdown.popover().panel_id()));

    open.set(true);
    for _ in 0..3 {
        tokio::task::yield_now().await;
    }
    assert!(host.is_visible(dropdown.popover().panel_id()));

    dropdown.close();
    assert!(!open.get());
    assert!(!host.is_visible(dropdown.popover().panel_id()));

    dropdown.open().await;
    assert!(open.get());
}

// ═════════════════════════════════════════════════════════════════════════
// Panel capability
// ═════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn capability_probed_once_across_opens() {
    let host = Arc::new(HeadlessHost::with_fallback(FallbackBehavior::Ready));
    let dropdown = Dropdown::builder()
        .with_items(abc())
        .with_config(SelectConfig::new().with_popover(fast_poll()))
        .with_environment(DropdownEnvironment::new(host.clone()))
        .build()
        .unwrap();

    for _ in 0..3 {
        assert_eq!(dropdown.trigger().click().await, PanelOutcome::Shown);
        assert!(host.is_visible(dropdown.popover().panel_id()));
        assert_eq!(dropdown.trigger().click().await, PanelOutcome::Hidden);
    }
    assert_eq!(host.probe_count(), 1);
    assert_eq!(host.load_count(), 1);
}

#[tokio::test]
async fn fallback_that_never_loads_keeps_panel_closed() {
    let host = Arc::new(HeadlessHost::with_fallback(FallbackBehavior::Never));
    let open = Bindable::new(false);
    let dropdown = Dropdown::builder()
        .with_items(abc())
        .with_config(SelectConfig::new().with_popover(fast_poll()))
        .with_open_binding(&open)
        .with_environment(DropdownEnvironment::new(host.clone()))
        .build()
        .unwrap();

    assert_eq!(dropdown.open().await, PanelOutcome::Degraded);
    assert!(!dropdown.is_open());
    assert!(!open.get());
    assert!(!host.is_visible(dropdown.popover().panel_id()));
}

#[tokio::test]
async fn failed_fallback_stays_degraded() {
    let host = Arc::new(HeadlessHost::with_fallback(FallbackBehavior::Fail(
        "script blocked".into(),
    )));
    let dropdown = Dropdown::builder()
        .with_items(abc())
        .with_config(SelectConfig::new().with_popover(fast_poll()))
        .with_environment(DropdownEnvironment::new(host.clone()))
        .build()
        .unwrap();

    assert_eq!(dropdown.open().await, PanelOutcome::Degraded);
    assert_eq!(dropdown.open().await, PanelOutcome::Degraded);
    assert_eq!(host.load_count(), 1);
    assert!(dropdown.popover().runtime_state().fallback_failed);
}

// ═════════════════════════════════════════════════════════════════════════
// Teardown
// ═════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn teardown_releases_panel_and_listeners() {
    let host = Arc::new(HeadlessHost::native());
    let pointer = Arc::new(Signal::<Point>::new());
    let value = Bindable::new(String::new());
    let dropdown = Dropdown::builder()
        .with_items(abc())
        .with_value_binding(&value)
        .with_environment(DropdownEnvironment::new(host.clone()).with_pointer_events(pointer.clone()))
        .build()
        .unwrap();

    dropdown.selection_changed().connect(|_| {});

    dropdown.open().await;
    assert!(host.is_visible(dropdown.popover().panel_id()));
    assert_eq!(pointer.connection_count(), 1);
    assert_eq!(value.observer_count(), 1);

    dropdown.teardown();
    assert!(!host.is_visible(dropdown.popover().panel_id()));
    assert_eq!(pointer.connection_count(), 0);
    assert_eq!(value.observer_count(), 0);
    assert_eq!(dropdown.selection_changed().connection_count(), 0);
    assert!(!dropdown.is_open());
    assert!(!dropdown.trigger().attributes().expanded);

    // Detached: external writes no longer reach the selection
    value.set("C".to_string());
    assert!(dropdown.selected_indices().is_empty());

    // Torn down for good: reopening shows nothing and arms nothing
    assert_eq!(dropdown.open().await, PanelOutcome::Unchanged);
    assert!(!dropdown.is_open());
    assert!(!host.is_visible(dropdown.popover().panel_id()));
    assert_eq!(pointer.connection_count(), 0);
}

#[tokio::test]
async fn dropping_last_handle_hides_panel() {
    let host = Arc::new(HeadlessHost::native());
    let panel_id = {
        let dropdown = Dropdown::builder()
            .with_items(abc())
            .with_environment(DropdownEnvironment::new(host.clone()))
            .build()
            .unwrap();
        dropdown.open().await;
        dropdown.popover().panel_id().to_string()
    };
    assert!(!host.is_visible(&panel_id));
}
