//! Slot stores: the tick buffers behind a timing bloom filter.
//!
//! A slot holds either `0` (never written, or expired) or the tick at which
//! it was last marked. Two encodings share one interface:
//!
//!   * [`ByteSlots`]: one slot per byte, ticks `1..=255`.
//!   * [`NibbleSlots`]: two slots per byte, ticks `1..=15`. Half the memory,
//!     half the distinguishable ticks.
//!
//! Stores are single-writer: `add` and `decay` mutate the buffer without
//! internal synchronization, so callers serialize them (`&mut self` does
//! this in safe code).
pub mod byte;
pub mod nibble;

pub use byte::ByteSlots;
pub use nibble::NibbleSlots;

use crate::error::{Result, TimingBloomError};
use crate::ring::TickWindow;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Buffers at least this long are decayed on the rayon pool.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1_000_000;

/// Bytes handed to one rayon task during a parallel decay.
const DECAY_CHUNK_BYTES: usize = 64 * 1024;

/// How ticks are packed into the slot buffer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SlotEncoding {
    /// 8-bit slots.
    Byte,
    /// 4-bit slots, high nibble first.
    #[default]
    Nibble,
}

impl SlotEncoding {
    /// Largest storable tick.
    pub const fn max_tick(self) -> u8 {
        match self {
            SlotEncoding::Byte => u8::MAX,
            SlotEncoding::Nibble => 0x0F,
        }
    }

    pub const fn slots_per_byte(self) -> usize {
        match self {
            SlotEncoding::Byte => 1,
            SlotEncoding::Nibble => 2,
        }
    }

    /// Buffer length needed to address `num_slots` slots.
    pub const fn buffer_len(self, num_slots: usize) -> usize {
        num_slots.div_ceil(self.slots_per_byte())
    }
}

/// The three slot primitives plus the accessors they are built from.
pub trait SlotStore {
    fn encoding(&self) -> SlotEncoding;

    fn num_slots(&self) -> usize;

    fn max_tick(&self) -> u8 {
        self.encoding().max_tick()
    }

    /// Raw buffer, for callers that persist or inspect it.
    fn as_bytes(&self) -> &[u8];

    /// Current value of a slot.
    fn get(&self, index: usize) -> Result<u8>;

    /// Overwrites a slot and returns its previous value.
    ///
    /// The tick is not validated here; [`SlotStore::add`] does that once per
    /// call.
    fn replace(&mut self, index: usize, tick: u8) -> Result<u8>;

    /// Expires every non-zero slot outside `window` and returns the number
    /// of slots still live.
    fn decay(&mut self, window: TickWindow) -> Result<usize>;

    /// Number of non-zero slots.
    fn count_live(&self) -> usize;

    /// Resets every slot to empty.
    fn clear(&mut self);

    /// Marks every slot in `indexes` with `tick`, last write wins.
    ///
    /// Returns how many of the touched slots were empty beforehand. Indexes
    /// are validated as they are pulled; on error, slots written earlier in
    /// the sequence keep their new value.
    fn add<I>(&mut self, indexes: I, tick: u8) -> Result<usize>
    where
        I: IntoIterator<Item = usize>,
    {
        check_tick(tick, self.max_tick())?;
        let mut newly_occupied = 0;
        for index in indexes {
            if self.replace(index, tick)? == 0 {
                newly_occupied += 1;
            }
        }
        Ok(newly_occupied)
    }

    /// True when every slot in `indexes` is live within `window`.
    ///
    /// Stops pulling from `indexes` at the first failing slot.
    fn contains<I>(&self, indexes: I, window: TickWindow) -> Result<bool>
    where
        I: IntoIterator<Item = usize>,
    {
        window.check_bounds(self.max_tick())?;
        for index in indexes {
            if !window.is_live(self.get(index)?) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Either encoding, chosen at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slots {
    Byte(ByteSlots),
    Nibble(NibbleSlots),
}

impl Slots {
    pub fn new(encoding: SlotEncoding, num_slots: usize) -> Result<Self> {
        Ok(match encoding {
            SlotEncoding::Byte => Slots::Byte(ByteSlots::new(num_slots)?),
            SlotEncoding::Nibble => Slots::Nibble(NibbleSlots::new(num_slots)?),
        })
    }

    /// Adopts an existing buffer, checking it matches the expected layout.
    pub fn from_bytes(
        encoding: SlotEncoding,
        num_slots: usize,
        data: Vec<u8>,
    ) -> Result<Self> {
        let expected = encoding.buffer_len(num_slots);
        if data.len() != expected {
            return Err(TimingBloomError::MalformedBuffer(format!(
                "{encoding:?} buffer for {num_slots} slots must be {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(match encoding {
            SlotEncoding::Byte => Slots::Byte(ByteSlots::from_bytes(data)?),
            SlotEncoding::Nibble => {
                Slots::Nibble(NibbleSlots::from_bytes(data)?)
            }
        })
    }

    pub fn with_parallel_threshold(self, threshold: usize) -> Self {
        match self {
            Slots::Byte(s) => Slots::Byte(s.with_parallel_threshold(threshold)),
            Slots::Nibble(s) => {
                Slots::Nibble(s.with_parallel_threshold(threshold))
            }
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Slots::Byte(s) => s.into_bytes(),
            Slots::Nibble(s) => s.into_bytes(),
        }
    }
}

impl SlotStore for Slots {
    fn encoding(&self) -> SlotEncoding {
        match self {
            Slots::Byte(s) => s.encoding(),
            Slots::Nibble(s) => s.encoding(),
        }
    }

    fn num_slots(&self) -> usize {
        match self {
            Slots::Byte(s) => s.num_slots(),
            Slots::Nibble(s) => s.num_slots(),
        }
    }

    fn as_bytes(&self) -> &[u8] {
        match self {
            Slots::Byte(s) => s.as_bytes(),
            Slots::Nibble(s) => s.as_bytes(),
        }
    }

    fn get(&self, index: usize) -> Result<u8> {
        match self {
            Slots::Byte(s) => s.get(index),
            Slots::Nibble(s) => s.get(index),
        }
    }

    fn replace(&mut self, index: usize, tick: u8) -> Result<u8> {
        match self {
            Slots::Byte(s) => s.replace(index, tick),
            Slots::Nibble(s) => s.replace(index, tick),
        }
    }

    fn decay(&mut self, window: TickWindow) -> Result<usize> {
        match self {
            Slots::Byte(s) => s.decay(window),
            Slots::Nibble(s) => s.decay(window),
        }
    }

    fn count_live(&self) -> usize {
        match self {
            Slots::Byte(s) => s.count_live(),
            Slots::Nibble(s) => s.count_live(),
        }
    }

    fn clear(&mut self) {
        match self {
            Slots::Byte(s) => s.clear(),
            Slots::Nibble(s) => s.clear(),
        }
    }

    // Forward the generic operations so the inner loops are monomorphized
    // per encoding instead of matching on every slot.
    fn add<I>(&mut self, indexes: I, tick: u8) -> Result<usize>
    where
        I: IntoIterator<Item = usize>,
    {
        match self {
            Slots::Byte(s) => s.add(indexes, tick),
            Slots::Nibble(s) => s.add(indexes, tick),
        }
    }

    fn contains<I>(&self, indexes: I, window: TickWindow) -> Result<bool>
    where
        I: IntoIterator<Item = usize>,
    {
        match self {
            Slots::Byte(s) => s.contains(indexes, window),
            Slots::Nibble(s) => s.contains(indexes, window),
        }
    }
}

pub(crate) fn check_index(index: usize, num_slots: usize) -> Result<()> {
    if index >= num_slots {
        return Err(TimingBloomError::IndexOutOfBounds { index, num_slots });
    }
    Ok(())
}

pub(crate) fn check_tick(tick: u8, max_tick: u8) -> Result<()> {
    if tick == 0 {
        return Err(TimingBloomError::SentinelTick);
    }
    if tick > max_tick {
        return Err(TimingBloomError::TickOutOfRange { tick, max_tick });
    }
    Ok(())
}

/// Runs `decay_chunk` over the whole buffer and sums the live counts.
///
/// Every byte belongs to exactly one chunk, so chunks can be processed on
/// separate rayon workers without locking.
pub(crate) fn decay_buffer<F>(
    buffer: &mut [u8],
    parallel_threshold: usize,
    decay_chunk: F,
) -> usize
where
    F: Fn(&mut [u8]) -> usize + Sync + Send,
{
    if buffer.len() < parallel_threshold {
        return decay_chunk(buffer);
    }
    trace!(
        bytes = buffer.len(),
        chunks = buffer.len().div_ceil(DECAY_CHUNK_BYTES),
        "parallel decay"
    );
    buffer.par_chunks_mut(DECAY_CHUNK_BYTES).map(decay_chunk).sum()
}
