//! Freshness windows over the wrapping tick space.
//!
//! Ticks live on a small ring (`0..=255` for byte slots, `0..=15` for nibble
//! slots). A window `(min, max]` selects the ticks written "recently"; once the
//! clock wraps, `max` can be numerically smaller than `min` and the window
//! covers both ends of the ring.

use crate::error::{Result, TimingBloomError};
use serde::{Deserialize, Serialize};

/// Half-open freshness window `(min, max]` on the tick ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickWindow {
    pub min: u8,
    pub max: u8,
}

impl TickWindow {
    pub const fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    /// The window crosses the ring boundary.
    ///
    /// Equal bounds are treated as non-wrapping, which makes the window empty.
    #[inline]
    pub const fn is_wrapping(&self) -> bool {
        self.max < self.min
    }

    /// Ring-interval test, shared by `contains` and `decay` of every encoding.
    #[inline]
    pub const fn is_fresh(&self, value: u8) -> bool {
        if self.is_wrapping() {
            value > self.min || value <= self.max
        } else {
            value > self.min && value <= self.max
        }
    }

    /// A slot is live when it was written (non-zero) and is still fresh.
    #[inline]
    pub const fn is_live(&self, value: u8) -> bool {
        value != 0 && self.is_fresh(value)
    }

    /// Both bounds must be representable in a slot of the given width.
    pub fn check_bounds(&self, max_tick: u8) -> Result<()> {
        for tick in [self.min, self.max] {
            if tick > max_tick {
                return Err(TimingBloomError::TickOutOfRange { tick, max_tick });
            }
        }
        Ok(())
    }
}

/// Maps an arbitrary (possibly negative) tick offset onto `1..=ring_size`.
#[inline]
pub fn wrap_tick(raw: i64, ring_size: u8) -> u8 {
    // rem_euclid keeps the result in 0..ring_size even for negative input
    (raw.rem_euclid(i64::from(ring_size)) + 1) as u8
}
