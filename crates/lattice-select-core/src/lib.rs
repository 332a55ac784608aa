//! Core reactive primitives for lattice-select.
//!
//! This crate provides the foundational pieces the dropdown widget is built
//! from:
//!
//! - **Signal/Slot System**: Type-safe observer notifications
//! - **Property System**: Change-detecting values and revision-stamped memos
//! - **Bindable Slots**: Externally owned values a widget reads and writes
//!   through weak handles
//! - **Runtime Helpers**: Task spawning and bounded polling on Tokio
//! - **Logging**: `tracing` targets for every subsystem
//!
//! # Signal/Slot Example
//!
//! ```
//! use lattice_select_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```
//!
//! # Bindable Example
//!
//! ```
//! use lattice_select_core::Bindable;
//!
//! let open = Bindable::new(false);
//! open.on_change(|now_open| println!("open: {now_open}"));
//! open.set(true);
//! ```

mod bindable;
mod error;
pub mod logging;
pub mod property;
pub mod runtime;
pub mod signal;

pub use bindable::{Bindable, WeakBindable};
pub use error::{BindingError, CoreError, Result, RuntimeError};
pub use property::{Memo, Property, Revision};
pub use signal::{ConnectionGuard, ConnectionId, Signal};

static_assertions::assert_impl_all!(Signal<String>: Send, Sync);
static_assertions::assert_impl_all!(Bindable<String>: Send, Sync);
