//! Property system for lattice-select.
//!
//! Reactive properties with change detection, plus the revision-stamped
//! memo used for derived state. Properties are the data backbone of the
//! signal/slot system: when a property changes, its owner emits a signal to
//! notify interested parties.
//!
//! # Types
//!
//! - **Property<T>**: A value cell whose `set` reports whether it changed
//! - **Revision**: A monotonically increasing state version counter
//! - **Memo<T>**: A derived value recomputed lazily when the revision moves
//!
//! # Example
//!
//! ```
//! use lattice_select_core::{Property, Signal};
//!
//! struct Counter {
//!     value: Property<i32>,
//!     value_changed: Signal<i32>,
//! }
//!
//! impl Counter {
//!     fn set_value(&self, new_value: i32) {
//!         if self.value.set(new_value) {
//!             self.value_changed.emit(new_value);
//!         }
//!     }
//! }
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};

/// A reactive property that tracks changes.
///
/// `Property<T>` wraps a value and provides change detection. When `set()` is
/// called, it compares the new value with the current one and returns whether
/// the value actually changed.
///
/// # Example
///
/// ```
/// use lattice_select_core::Property;
///
/// let prop = Property::new(42);
/// assert!(!prop.set(42));
/// assert!(prop.set(100));
/// assert_eq!(prop.get(), 100);
/// ```
pub struct Property<T> {
    value: RwLock<T>,
}

impl<T: Clone> Property<T> {
    /// Create a new property with an initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Get the current value.
    ///
    /// This clones the value. For large types, consider using `with()` instead.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Access the value through a closure without cloning.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.value.read())
    }
}

impl<T: Clone + PartialEq> Property<T> {
    /// Set the value, returning `true` if the value changed.
    ///
    /// The caller should emit the associated notification signal when this
    /// returns `true`.
    pub fn set(&self, value: T) -> bool {
        let mut current = self.value.write();
        if *current != value {
            *current = value;
            true
        } else {
            false
        }
    }
}

impl<T: Clone + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &self.get())
            .finish()
    }
}

/// A monotonically increasing state version.
///
/// Owners bump the revision after every mutation; readers compare the
/// revision they last saw to decide whether derived data is stale.
#[derive(Debug, Default)]
pub struct Revision(AtomicU64);

impl Revision {
    /// Create a revision counter starting at zero.
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// The current revision.
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    /// Advance the revision, returning the new value.
    pub fn bump(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }
}

/// A derived value cached against a [`Revision`].
///
/// `get` recomputes only when the supplied revision differs from the one the
/// cached value was computed at.
///
/// ```
/// use lattice_select_core::{Memo, Revision};
///
/// let revision = Revision::new();
/// let memo = Memo::new();
/// assert_eq!(memo.get(revision.current(), || 1), 1);
/// // Same revision: the cached value wins.
/// assert_eq!(memo.get(revision.current(), || 2), 1);
/// revision.bump();
/// assert_eq!(memo.get(revision.current(), || 2), 2);
/// ```
pub struct Memo<T> {
    cached: Mutex<Option<(u64, T)>>,
}

impl<T: Clone> Memo<T> {
    /// Create an empty memo.
    pub fn new() -> Self {
        Self {
            cached: Mutex::new(None),
        }
    }

    /// Get the value for `revision`, computing it if the cache is stale.
    pub fn get<F>(&self, revision: u64, compute: F) -> T
    where
        F: FnOnce() -> T,
    {
        let mut cached = self.cached.lock();
        match cached.as_ref() {
            Some((at, value)) if *at == revision => value.clone(),
            _ => {
                let value = compute();
                *cached = Some((revision, value.clone()));
                value
            }
        }
    }

    /// Drop the cached value.
    pub fn invalidate(&self) {
        *self.cached.lock() = None;
    }

    /// Whether a value computed at `revision` is cached.
    pub fn is_fresh(&self, revision: u64) -> bool {
        matches!(self.cached.lock().as_ref(), Some((at, _)) if *at == revision)
    }
}

impl<T: Clone> Default for Memo<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Memo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memo")
            .field("revision", &self.cached.lock().as_ref().map(|(at, _)| *at))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_property_set_detects_change() {
        let prop = Property::new(10);
        assert!(!prop.set(10));
        assert!(prop.set(20));
        assert_eq!(prop.get(), 20);
    }

    #[test]
    fn test_property_with_borrows() {
        let prop = Property::new(vec![1, 2, 3]);
        let sum: i32 = prop.with(|v| v.iter().sum());
        assert_eq!(sum, 6);
    }

    #[test]
    fn test_revision_bump() {
        let revision = Revision::new();
        assert_eq!(revision.current(), 0);
        assert_eq!(revision.bump(), 1);
        assert_eq!(revision.bump(), 2);
        assert_eq!(revision.current(), 2);
    }

    #[test]
    fn test_memo_recomputes_only_on_new_revision() {
        let calls = AtomicUsize::new(0);
        let memo = Memo::new();
        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            "derived".to_string()
        };

        assert_eq!(memo.get(1, compute), "derived");
        assert_eq!(memo.get(1, compute), "derived");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(memo.is_fresh(1));

        memo.get(2, compute);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        memo.invalidate();
        assert!(!memo.is_fresh(2));
    }
}
