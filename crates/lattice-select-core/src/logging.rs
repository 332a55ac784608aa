//! Logging facilities for lattice-select.
//!
//! lattice-select uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("lattice_select=debug")
//!     .init();
//! ```
//!
//! Every log line carries one of the [`targets`] below so individual
//! subsystems can be filtered.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "lattice_select_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "lattice_select_core::signal";
    /// Async runtime helpers target.
    pub const RUNTIME: &str = "lattice_select_core::runtime";
    /// Item registry construction.
    pub const REGISTRY: &str = "lattice_select::registry";
    /// Selection engine.
    pub const SELECTION: &str = "lattice_select::selection";
    /// Popover lifecycle engine.
    pub const POPOVER: &str = "lattice_select::popover";
    /// Binding reconciler.
    pub const BINDING: &str = "lattice_select::binding";
    /// Composite root and parts.
    pub const DROPDOWN: &str = "lattice_select::dropdown";
}

/// Span names used for tracing.
pub mod span_names {
    /// Polyfill readiness wait.
    pub const POLYFILL_WAIT: &str = "lattice_select::polyfill_wait";
    /// Outbound/inbound binding reconciliation.
    pub const RECONCILE: &str = "lattice_select::reconcile";
}
