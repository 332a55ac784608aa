//! Externally owned, observable value slots.
//!
//! A [`Bindable<T>`] is a shared [`Property`] paired with a change
//! [`Signal`]. Application code creates one, keeps it, and hands a
//! [`WeakBindable`] to a widget. The widget can read and write the slot and
//! observe changes made by the owner, but never keeps the slot alive.
//!
//! ```
//! use lattice_select_core::Bindable;
//!
//! let value = Bindable::new(String::new());
//! let weak = value.downgrade();
//!
//! value.set("dark".to_string());
//! assert_eq!(weak.upgrade().map(|slot| slot.get()), Some("dark".to_string()));
//!
//! drop(value);
//! assert!(weak.upgrade().is_none());
//! ```

use std::fmt;
use std::sync::{Arc, Weak};

use crate::error::BindingError;
use crate::property::Property;
use crate::signal::{ConnectionGuard, ConnectionId, Signal};

struct BindableCell<T> {
    value: Property<T>,
    changed: Signal<T>,
}

/// A shared observable value slot.
///
/// Cloning a `Bindable` produces another handle to the same slot.
pub struct Bindable<T> {
    cell: Arc<BindableCell<T>>,
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Bindable<T> {
    /// Create a slot holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            cell: Arc::new(BindableCell {
                value: Property::new(value),
                changed: Signal::new(),
            }),
        }
    }

    /// Current value.
    pub fn get(&self) -> T {
        self.cell.value.get()
    }

    /// Access the current value without cloning.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        self.cell.value.with(f)
    }

    /// Store `value`, notifying observers if it differs from the current one.
    ///
    /// Returns `true` when the value changed.
    pub fn set(&self, value: T) -> bool {
        if self.cell.value.set(value.clone()) {
            self.cell.changed.emit(value);
            true
        } else {
            false
        }
    }

    /// Observe changes to the slot.
    pub fn on_change<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.cell.changed.connect(slot)
    }

    /// Observe changes until the returned guard is dropped.
    pub fn on_change_scoped<F>(&self, slot: F) -> ConnectionGuard<T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.cell.changed.connect_scoped(slot)
    }

    /// Stop observing.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.cell.changed.disconnect(id)
    }

    /// Number of observers.
    pub fn observer_count(&self) -> usize {
        self.cell.changed.connection_count()
    }

    /// A non-owning handle to this slot.
    pub fn downgrade(&self) -> WeakBindable<T> {
        WeakBindable {
            cell: Arc::downgrade(&self.cell),
        }
    }
}

impl<T> Clone for Bindable<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T: Clone + PartialEq + Send + Sync + fmt::Debug + 'static> fmt::Debug for Bindable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bindable").field("value", &self.get()).finish()
    }
}

/// A non-owning handle to a [`Bindable`].
pub struct WeakBindable<T> {
    cell: Weak<BindableCell<T>>,
}

impl<T> WeakBindable<T> {
    /// Upgrade to a strong handle if the owner still holds the slot.
    pub fn upgrade(&self) -> Option<Bindable<T>> {
        self.cell.upgrade().map(|cell| Bindable { cell })
    }

    /// Like [`upgrade`](Self::upgrade), naming the slot in the error.
    pub fn try_upgrade(&self, name: &'static str) -> Result<Bindable<T>, BindingError> {
        self.upgrade().ok_or(BindingError::Dropped { name })
    }

    /// Whether the owner has dropped every strong handle.
    pub fn is_dropped(&self) -> bool {
        self.cell.strong_count() == 0
    }
}

impl<T> Clone for WeakBindable<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Weak::clone(&self.cell),
        }
    }
}

impl<T> fmt::Debug for WeakBindable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakBindable")
            .field("dropped", &self.is_dropped())
            .finish()
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> From<&Bindable<T>> for WeakBindable<T> {
    fn from(bindable: &Bindable<T>) -> Self {
        bindable.downgrade()
    }
}
