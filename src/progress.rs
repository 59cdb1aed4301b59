//! Shutdown progress reporting.
//!
//! Once shutdown has begun, prints the cumulative elapsed time every
//! `interval` so the operator can see the process is still alive. The task
//! has no end condition of its own: it runs until stopped or until the
//! process exits.

use crate::console::Console;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Handle to the running reporter task.
#[derive(Debug)]
pub struct ProgressReporter {
    handle: JoinHandle<()>,
}

impl ProgressReporter {
    /// Spawn the reporter. The first line appears one `interval` after start.
    pub fn start<C: Console>(interval: Duration, console: C) -> Self {
        let interval = interval.max(Duration::from_millis(1));
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut ticks: u32 = 0;
            loop {
                ticker.tick().await;
                ticks = ticks.saturating_add(1);
                let elapsed = interval.saturating_mul(ticks);
                tracing::debug!(elapsed_secs = elapsed.as_secs(), "shutdown still in progress");
                console.line(&format_elapsed(elapsed));
            }
        });
        Self { handle }
    }

    /// Cancel the reporter and wait for the task to wind down. No further
    /// lines are printed once this returns.
    pub async fn stop(self) {
        self.handle.abort();
        if let Err(e) = self.handle.await {
            if !e.is_cancelled() {
                tracing::debug!(error = %e, "progress reporter ended abnormally");
            }
        }
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    format!("{} seconds", elapsed.as_secs())
}
