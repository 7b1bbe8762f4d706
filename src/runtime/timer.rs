//! Cancellable fixed-interval timer.
//!
//! The first tick fires one period after spawning. Stopping is observed before
//! every tick: a stopped timer never runs its body again, while a body that is
//! already running completes normally.

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use super::Spawn;

/// Handle to a running periodic task. Dropping the handle stops the task.
#[derive(Debug)]
pub struct PeriodicTask {
    name: &'static str,
    stop_tx: watch::Sender<bool>,
}

impl PeriodicTask {
    /// Spawn `tick` every `period`. Returning [`ControlFlow::Break`] from the
    /// body ends the task.
    pub fn spawn<S, F>(spawner: &S, name: &'static str, period: Duration, mut tick: F) -> Self
    where
        S: Spawn,
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let period = period.max(Duration::from_millis(1));
        let (stop_tx, mut stop_rx) = watch::channel(false);

        spawner.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = stop_rx.changed() => break,
                    _ = ticker.tick() => {
                        if *stop_rx.borrow() || tick().is_break() {
                            break;
                        }
                    }
                }
            }
            debug!(task = name, "periodic task finished");
        });

        debug!(
            task = name,
            period_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
            "periodic task started"
        );
        Self { name, stop_tx }
    }

    /// Stop firing. Idempotent.
    pub fn stop(&self) {
        if !self.stop_tx.send_replace(true) {
            debug!(task = self.name, "periodic task stop requested");
        }
    }

    /// Whether [`PeriodicTask::stop`] has been called.
    pub fn is_stopped(&self) -> bool {
        *self.stop_tx.borrow()
    }

    /// Task name used in logs.
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.stop();
    }
}
