//! Periodic background decay on a tokio runtime.

use crate::error::{Result, TimingBloomError};
use crate::filter::TimingBloomFilter;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error};

/// Handle to a running decay task. Dropping it stops the task.
pub struct DecayTicker {
    handle: JoinHandle<()>,
    period: Duration,
}

impl DecayTicker {
    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for DecayTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Runs `decay` on `filter` every `period`, starting immediately.
///
/// Must be called from within a tokio runtime.
pub fn spawn_decay_ticker(
    filter: Arc<Mutex<TimingBloomFilter>>,
    period: Duration,
) -> Result<DecayTicker> {
    if period.is_zero() {
        return Err(TimingBloomError::InvalidConfig(
            "Decay period must be greater than 0".into(),
        ));
    }

    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let mut guard = filter.lock().await;
            match guard.decay() {
                Ok(live) => debug!(live, "decay tick"),
                Err(e) => error!("decay tick failed: {e}"),
            }
        }
    });

    Ok(DecayTicker { handle, period })
}

/// Like [`spawn_decay_ticker`] with the filter clock's decay interval.
pub async fn spawn_default_decay_ticker(
    filter: Arc<Mutex<TimingBloomFilter>>,
) -> Result<DecayTicker> {
    let period = filter.lock().await.clock().decay_interval();
    spawn_decay_ticker(filter, period)
}
