use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;

/// Minimum spacing between two outbound calls.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(250);

/// Global serialization point for outbound remote calls.
///
/// At most one permit exists at a time across all clones of a gate. A new
/// permit is handed out only after the quiet period has elapsed since the
/// previous permit was released.
#[derive(Clone, Debug)]
pub struct RateGate {
    last_release: Arc<Mutex<Option<Instant>>>,
    quiet_period: Duration,
}

/// Exclusive right to perform one remote call. Dropping it releases the gate.
#[derive(Debug)]
pub struct GatePermit<'a> {
    guard: MutexGuard<'a, Option<Instant>>,
}

impl RateGate {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            last_release: Arc::new(Mutex::new(None)),
            quiet_period,
        }
    }

    pub const fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Wait for exclusive access, then for the quiet period to pass.
    pub async fn acquire(&self) -> GatePermit<'_> {
        let guard = self.last_release.lock().await;
        if let Some(released_at) = *guard {
            let elapsed = released_at.elapsed();
            if elapsed < self.quiet_period {
                let wait = self.quiet_period - elapsed;
                tracing::trace!(wait_ms = wait.as_millis(), "Rate gate quiet period");
                tokio::time::sleep(wait).await;
            }
        }
        GatePermit { guard }
    }
}

impl Default for RateGate {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

impl Drop for GatePermit<'_> {
    fn drop(&mut self) {
        *self.guard = Some(Instant::now());
    }
}
