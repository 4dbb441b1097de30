//! Wall-clock to tick mapping.
//!
//! Ticks cycle through `1..=ring_size`, where `ring_size` is the largest tick
//! a slot can hold. Half of the ring spans one `decay_time`, so an entry stays
//! visible for `decay_time` after it was written and the other half of the
//! ring guards against wrapped ticks being mistaken for fresh ones.

use crate::error::{Result, TimingBloomError};
use crate::ring::{TickWindow, wrap_tick};
use crate::slots::SlotEncoding;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Time since the unix epoch.
pub fn since_epoch() -> Result<Duration> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickClock {
    ring_size: u8,
    half_ring: u8,
    seconds_per_tick: f64,
}

impl TickClock {
    pub fn new(decay_time: Duration, encoding: SlotEncoding) -> Result<Self> {
        if decay_time.is_zero() {
            return Err(TimingBloomError::InvalidConfig(
                "Decay time must be greater than 0".into(),
            ));
        }
        let ring_size = encoding.max_tick();
        let half_ring = ring_size / 2;
        Ok(Self {
            ring_size,
            half_ring,
            seconds_per_tick: decay_time.as_secs_f64() / f64::from(half_ring),
        })
    }

    pub fn ring_size(&self) -> u8 {
        self.ring_size
    }

    /// Ticks in one freshness window.
    pub fn half_ring(&self) -> u8 {
        self.half_ring
    }

    pub fn seconds_per_tick(&self) -> f64 {
        self.seconds_per_tick
    }

    /// How often decay should run to expire entries on time.
    pub fn decay_interval(&self) -> Duration {
        Duration::from_secs_f64(self.seconds_per_tick / 2.0)
    }

    /// Tick for a timestamp given as time since the unix epoch.
    pub fn tick_at(&self, since_epoch: Duration) -> u8 {
        let elapsed_ticks =
            (since_epoch.as_secs_f64() / self.seconds_per_tick).floor() as u64;
        (elapsed_ticks % u64::from(self.ring_size)) as u8 + 1
    }

    /// Freshness window ending at the tick for `since_epoch`.
    pub fn window_at(&self, since_epoch: Duration) -> TickWindow {
        let max = self.tick_at(since_epoch);
        let min = wrap_tick(
            i64::from(max) - i64::from(self.half_ring) - 1,
            self.ring_size,
        );
        TickWindow::new(min, max)
    }

    pub fn tick_now(&self) -> Result<u8> {
        Ok(self.tick_at(since_epoch()?))
    }

    pub fn window_now(&self) -> Result<TickWindow> {
        Ok(self.window_at(since_epoch()?))
    }
}
