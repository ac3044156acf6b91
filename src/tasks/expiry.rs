//! TTL Expiry Timers
//!
//! Spawns one deferred task per expiring entry and wraps its handle so the
//! cache can cancel it when the entry is replaced or removed.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::trace;

// == Expiry Timer ==
/// Cancellable handle to a scheduled expiry.
///
/// Cancelling is idempotent: aborting a task that already fired or was
/// already aborted does nothing. Dropping the timer cancels it.
#[derive(Debug)]
pub struct ExpiryTimer {
    /// Generation id, compared by the firing task against the expiry table
    id: u64,
    /// When the expiry fires
    deadline: Instant,
    task: JoinHandle<()>,
}

impl ExpiryTimer {
    pub fn id(&self) -> u64 {
        self.id
    }

    // == Remaining ==
    /// Time left before the timer fires, saturating at zero.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    // == Cancel ==
    /// Aborts the pending task.
    pub fn cancel(&self) {
        if !self.task.is_finished() {
            trace!("Cancelling expiry timer {}", self.id);
        }
        self.task.abort();
    }

    /// Returns true once the task has run to completion or been aborted.
    #[cfg(test)]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for ExpiryTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawns a task on `runtime` that runs `on_expire` once `ttl` has elapsed.
///
/// Returns None without spawning anything when the deadline lies beyond
/// what `Instant` can represent: such a timer could never fire.
///
/// The callback returns nothing and has no way to report failure. Callers
/// must make it a no-op when the entry it targets has since been replaced,
/// since cancellation cannot stop a callback that is already running.
///
/// # Example
/// ```ignore
/// let timer = spawn_expiry(&Handle::current(), 7, Duration::from_millis(100), || {
///     cache.lock().expire(&key, 7);
/// });
/// // Entry overwritten before the deadline:
/// if let Some(timer) = timer {
///     timer.cancel();
/// }
/// ```
pub fn spawn_expiry<F>(
    runtime: &Handle,
    id: u64,
    ttl: Duration,
    on_expire: F,
) -> Option<ExpiryTimer>
where
    F: FnOnce() + Send + 'static,
{
    let Some(deadline) = Instant::now().checked_add(ttl) else {
        trace!("Expiry timer {} not scheduled, {:?} overflows the clock", id, ttl);
        return None;
    };
    trace!("Scheduling expiry timer {} in {:?}", id, ttl);
    let task = runtime.spawn(async move {
        tokio::time::sleep_until(deadline).await;
        on_expire();
    });

    Some(ExpiryTimer { id, deadline, task })
}
