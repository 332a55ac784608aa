//! Error types for the dropdown widget.

use lattice_select_core::CoreError;

/// Result type alias for dropdown operations.
pub type Result<T> = std::result::Result<T, SelectError>;

/// The main error type for dropdown construction and panel loading.
#[derive(Debug, thiserror::Error)]
pub enum SelectError {
    /// The declared items are malformed.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The floating panel could not be made available.
    #[error("Popover error: {0}")]
    Popover(#[from] PopoverError),

    /// Error bubbled up from the core primitives.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Errors raised while turning a declaration into an item registry.
///
/// These are fatal: the widget is never constructed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// An item label held something other than plain text.
    #[error("Item label at index {index} must be plain text, found {found}")]
    NonTextLabel {
        /// Index of the owning item.
        index: usize,
        /// Description of what was found instead.
        found: &'static str,
    },

    /// An item was declared without a label.
    #[error("Item at index {index} has no label")]
    MissingLabel {
        /// Index of the item.
        index: usize,
    },

    /// An item was declared with more than one label.
    #[error("Item at index {index} has {count} labels, expected exactly one")]
    MultipleLabels {
        /// Index of the item.
        index: usize,
        /// Number of labels found.
        count: usize,
    },

    /// An item label appeared outside of any item, so it has no index.
    #[error("Item label \"{label}\" is not inside an item")]
    OrphanLabel {
        /// The label text, or a description of it.
        label: String,
    },

    /// An item was declared inside another item.
    #[error("Item nested inside item at index {parent}")]
    NestedItem {
        /// Index of the enclosing item.
        parent: usize,
    },
}

/// Errors raised by the panel host while preparing the fallback
/// implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PopoverError {
    /// The host failed to load the fallback implementation.
    #[error("Failed to load panel fallback: {0}")]
    LoadFailed(String),

    /// The fallback never reported ready.
    #[error("Panel fallback not ready after {attempts} checks")]
    NotReady {
        /// Number of readiness checks made.
        attempts: u32,
    },

    /// No async runtime was available to load the fallback on.
    #[error("No async runtime available to load panel fallback")]
    NoRuntime,

    /// The popover was torn down while waiting.
    #[error("Panel wait cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_messages() {
        let err = ConfigurationError::NonTextLabel {
            index: 2,
            found: "markup",
        };
        assert_eq!(
            err.to_string(),
            "Item label at index 2 must be plain text, found markup"
        );

        let err: SelectError = ConfigurationError::MissingLabel { index: 0 }.into();
        assert!(err.to_string().starts_with("Configuration error:"));
    }

    #[test]
    fn test_popover_message() {
        let err: SelectError = PopoverError::NotReady { attempts: 200 }.into();
        assert_eq!(
            err.to_string(),
            "Popover error: Panel fallback not ready after 200 checks"
        );
    }
}
