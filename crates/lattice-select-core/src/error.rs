//! Error types for lattice-select-core.

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// The main error type for core operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An external binding could not be reached.
    #[error("Binding error: {0}")]
    Binding(#[from] BindingError),

    /// Async runtime error.
    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

/// Errors raised when talking to an externally owned slot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    /// The owner dropped the slot.
    #[error("Bound slot '{name}' has been dropped by its owner")]
    Dropped {
        /// The slot name.
        name: &'static str,
    },
}

/// Async runtime errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    /// No Tokio runtime is driving the current thread.
    #[error("No async runtime available on this thread")]
    NoRuntime,

    /// A bounded wait ran out of attempts.
    #[error("Gave up after {attempts} attempts")]
    Exhausted {
        /// Number of attempts made.
        attempts: u32,
    },

    /// The wait was cancelled by teardown.
    #[error("Wait cancelled")]
    Cancelled,
}
