use crate::hash::{optimal_num_hashes, optimal_num_slots};
use crate::slots::SlotEncoding;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a [`TimingBloomFilter`](crate::TimingBloomFilter).
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(pattern = "owned")]
pub struct TimingFilterConfig {
    /// Number of live items the filter is sized for
    #[builder(default = "1_000_000")]
    pub capacity: usize,

    /// Target false positive rate (between 0 and 1)
    #[builder(default = "0.005")]
    pub false_positive_rate: f64,

    /// How long an inserted item stays visible
    #[builder(default = "Duration::from_secs(60)")]
    pub decay_time: Duration,

    /// Slot width: bytes for long tick horizons, nibbles for half the memory
    #[builder(default)]
    #[serde(default)]
    pub encoding: SlotEncoding,
}

impl TimingFilterConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.capacity == 0 {
            return Err("Capacity must be greater than 0".to_string());
        }
        if self.false_positive_rate <= 0.0 || self.false_positive_rate >= 1.0 {
            return Err(format!(
                "False positive rate must be between 0 and 1, got {}",
                self.false_positive_rate
            ));
        }
        if self.decay_time.is_zero() {
            return Err("Decay time must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Derived parameters calculated from TimingFilterConfig
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterParams {
    pub num_slots: usize,
    pub num_hashes: usize,
}

impl From<&TimingFilterConfig> for FilterParams {
    fn from(config: &TimingFilterConfig) -> Self {
        let min_slots =
            optimal_num_slots(config.capacity, config.false_positive_rate);
        // whole bytes only, so nibble stores get an even slot count
        let per_byte = config.encoding.slots_per_byte();
        let num_slots = min_slots.max(1).div_ceil(per_byte) * per_byte;
        let num_hashes = optimal_num_hashes(config.capacity, num_slots);

        Self {
            num_slots,
            num_hashes,
        }
    }
}
