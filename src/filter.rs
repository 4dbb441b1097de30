use crate::clock::{TickClock, since_epoch};
use crate::config::{FilterParams, TimingFilterConfig};
use crate::error::{Result, TimingBloomError};
use crate::hash::{SlotIndexes, slot_indexes};
use crate::slots::{SlotStore, Slots};
use std::time::Duration;
use tracing::{debug, warn};

/// Bloom filter whose entries expire `decay_time` after their last insert.
///
/// Expiry is lazy for queries (stale slots fail the freshness window) and
/// eager after [`decay`](Self::decay), which also reclaims the slots. Call
/// `decay` roughly every [`TickClock::decay_interval`], or use the `ticker`
/// feature to do it in the background.
pub struct TimingBloomFilter {
    config: TimingFilterConfig,
    params: FilterParams,
    clock: TickClock,
    slots: Slots,
    num_non_zero: usize,
}

impl TimingBloomFilter {
    pub fn new(config: TimingFilterConfig) -> Result<Self> {
        config.validate()?;

        let params = FilterParams::from(&config);
        let clock = TickClock::new(config.decay_time, config.encoding)?;
        let slots = Slots::new(config.encoding, params.num_slots)?;

        debug!(
            capacity = config.capacity,
            num_slots = params.num_slots,
            num_hashes = params.num_hashes,
            encoding = ?config.encoding,
            seconds_per_tick = clock.seconds_per_tick(),
            "created timing bloom filter"
        );

        Ok(Self {
            config,
            params,
            clock,
            slots,
            num_non_zero: 0,
        })
    }

    /// Rebuilds a filter around a previously saved slot buffer.
    pub fn from_slots(config: TimingFilterConfig, slots: Slots) -> Result<Self> {
        config.validate()?;

        let params = FilterParams::from(&config);
        if slots.encoding() != config.encoding
            || slots.num_slots() != params.num_slots
        {
            return Err(TimingBloomError::MalformedBuffer(format!(
                "expected {:?} slots x{}, got {:?} slots x{}",
                config.encoding,
                params.num_slots,
                slots.encoding(),
                slots.num_slots()
            )));
        }
        let clock = TickClock::new(config.decay_time, config.encoding)?;
        let num_non_zero = slots.count_live();

        Ok(Self {
            config,
            params,
            clock,
            slots,
            num_non_zero,
        })
    }

    fn indexes(&self, item: &[u8]) -> SlotIndexes {
        slot_indexes(item, self.params.num_hashes, self.params.num_slots)
    }

    pub fn insert(&mut self, item: &[u8]) -> Result<()> {
        self.insert_at(item, since_epoch()?)
    }

    /// Inserts `item` as if at `timestamp` (time since the unix epoch).
    pub fn insert_at(&mut self, item: &[u8], timestamp: Duration) -> Result<()> {
        let tick = self.clock.tick_at(timestamp);
        let indexes = self.indexes(item);
        self.num_non_zero += self.slots.add(indexes, tick)?;
        Ok(())
    }

    pub fn contains(&self, item: &[u8]) -> Result<bool> {
        self.contains_at(item, since_epoch()?)
    }

    pub fn contains_at(&self, item: &[u8], timestamp: Duration) -> Result<bool> {
        let window = self.clock.window_at(timestamp);
        self.slots.contains(self.indexes(item), window)
    }

    /// Expires stale slots and returns the number still live.
    pub fn decay(&mut self) -> Result<usize> {
        self.decay_at(since_epoch()?)
    }

    pub fn decay_at(&mut self, timestamp: Duration) -> Result<usize> {
        let window = self.clock.window_at(timestamp);
        let before = self.num_non_zero;
        self.num_non_zero = self.slots.decay(window)?;

        debug!(
            tick_min = window.min,
            tick_max = window.max,
            expired = before.saturating_sub(self.num_non_zero),
            live = self.num_non_zero,
            "decayed timing bloom filter"
        );
        if self.is_saturated() {
            warn!(
                estimated_len = self.estimated_len(),
                capacity = self.config.capacity,
                "timing bloom filter over capacity"
            );
        }

        Ok(self.num_non_zero)
    }

    /// Empties every slot.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.num_non_zero = 0;
    }

    /// Slots currently holding a tick.
    pub fn num_non_zero(&self) -> usize {
        self.num_non_zero
    }

    /// Estimated number of distinct live items.
    ///
    /// Infinite once every slot is occupied.
    pub fn estimated_len(&self) -> f64 {
        let m = self.params.num_slots as f64;
        let k = self.params.num_hashes as f64;
        let fill = self.num_non_zero as f64 / m;
        if fill >= 1.0 {
            return f64::INFINITY;
        }
        -m * (1.0 - fill).ln() / k
    }

    /// More live items than the filter was sized for.
    pub fn is_saturated(&self) -> bool {
        self.estimated_len() > self.config.capacity as f64
    }

    pub fn expected_error(&self) -> f64 {
        self.config.false_positive_rate
    }

    pub fn config(&self) -> &TimingFilterConfig {
        &self.config
    }

    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    pub fn clock(&self) -> &TickClock {
        &self.clock
    }

    pub fn slots(&self) -> &Slots {
        &self.slots
    }

    pub fn into_slots(self) -> Slots {
        self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimingFilterConfigBuilder;
    use crate::slots::SlotEncoding;

    fn filter(encoding: SlotEncoding) -> TimingBloomFilter {
        let config = TimingFilterConfigBuilder::default()
            .capacity(1000)
            .false_positive_rate(0.01)
            .decay_time(Duration::from_secs(70))
            .encoding(encoding)
            .build()
            .expect("Unable to build TimingFilterConfig");
        TimingBloomFilter::new(config).expect("Failed to create filter")
    }

    #[test]
    fn test_workflow() {
        let mut filter = filter(SlotEncoding::Nibble);

        filter.insert(b"some data").unwrap();
        filter.insert(b"another data").unwrap();
        assert!(filter.contains(b"some data").unwrap());
        assert!(filter.contains(b"another data").unwrap());
        assert!(!filter.contains(b"some").unwrap());
        assert!(!filter.contains(b"another").unwrap());
    }

    #[test]
    fn test_num_non_zero_tracks_new_slots_only() {
        let mut filter = filter(SlotEncoding::Byte);
        let ts = Duration::from_secs(1_000);

        filter.insert_at(b"item", ts).unwrap();
        let occupied = filter.num_non_zero();
        assert!(occupied > 0 && occupied <= filter.params().num_hashes);

        filter.insert_at(b"item", ts + Duration::from_secs(1)).unwrap();
        assert_eq!(filter.num_non_zero(), occupied);
        assert_eq!(filter.slots().count_live(), occupied);
    }

    #[test]
    fn test_estimated_len() {
        let mut filter = filter(SlotEncoding::Byte);
        assert_eq!(filter.estimated_len(), 0.0);

        let ts = Duration::from_secs(5_000);
        for i in 0..100 {
            filter.insert_at(format!("item_{i}").as_bytes(), ts).unwrap();
        }
        let estimate = filter.estimated_len();
        assert!((90.0..110.0).contains(&estimate), "estimate {estimate}");
        assert!(!filter.is_saturated());
    }

    #[test]
    fn test_from_slots_rejects_mismatched_buffer() {
        let config = filter(SlotEncoding::Byte).config().clone();
        let slots = Slots::new(SlotEncoding::Byte, 10).unwrap();
        let err = TimingBloomFilter::from_slots(config, slots).err().unwrap();
        assert!(err.is_malformed_input());
    }
}
