//! Async runtime integration for lattice-select.
//!
//! Widgets never own a runtime. They spawn onto whatever Tokio runtime
//! drives the calling thread and use [`poll_until`] for bounded readiness
//! waits.
//!
//! # Example: Bounded Wait
//!
//! ```no_run
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::sync::Arc;
//! use lattice_select_core::runtime::{poll_until, CancelFlag, PollPolicy};
//!
//! # async fn demo() {
//! let ready = Arc::new(AtomicBool::new(false));
//! let flag = ready.clone();
//! let outcome = poll_until(
//!     move || flag.load(Ordering::Acquire),
//!     PollPolicy::default(),
//!     &CancelFlag::new(),
//! )
//! .await;
//! # }
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::error::RuntimeError;
use crate::logging::targets;

/// How often and how long to poll for a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollPolicy {
    /// Delay between checks.
    #[serde(with = "duration_millis")]
    pub interval: Duration,
    /// Maximum number of delayed checks after the first immediate one.
    pub max_attempts: u32,
}

impl PollPolicy {
    /// Create a policy.
    pub const fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Upper bound on the time a wait can take.
    pub fn budget(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts)
    }
}

impl Default for PollPolicy {
    /// 10ms interval, 2 seconds total.
    fn default() -> Self {
        Self::new(Duration::from_millis(10), 200)
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

/// A shared teardown flag.
///
/// Pending waits observe it between polls and stop without acting.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create an unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag. Irreversible.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether the flag is set.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Poll `condition` until it holds, the policy is exhausted, or `cancel`
/// is set.
///
/// Returns the number of delayed checks that were needed.
pub async fn poll_until<F>(
    condition: F,
    policy: PollPolicy,
    cancel: &CancelFlag,
) -> Result<u32, RuntimeError>
where
    F: Fn() -> bool,
{
    if condition() {
        return Ok(0);
    }

    for attempt in 1..=policy.max_attempts {
        tokio::time::sleep(policy.interval).await;
        if cancel.is_cancelled() {
            tracing::debug!(target: targets::RUNTIME, attempt, "poll cancelled");
            return Err(RuntimeError::Cancelled);
        }
        if condition() {
            return Ok(attempt);
        }
    }

    tracing::warn!(
        target: targets::RUNTIME,
        attempts = policy.max_attempts,
        "condition did not become ready"
    );
    Err(RuntimeError::Exhausted {
        attempts: policy.max_attempts,
    })
}

/// Handle to a spawned task. Aborts the task when dropped.
#[derive(Debug)]
pub struct TaskHandle {
    inner: JoinHandle<()>,
}

impl TaskHandle {
    /// Abort the task.
    pub fn abort(&self) {
        self.inner.abort();
    }

    /// Whether the task has completed or been aborted.
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.inner.abort();
    }
}

/// Spawn `future` on the runtime driving the current thread.
pub fn spawn<F>(future: F) -> Result<TaskHandle, RuntimeError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let handle = Handle::try_current().map_err(|_| RuntimeError::NoRuntime)?;
    Ok(TaskHandle {
        inner: handle.spawn(future),
    })
}
