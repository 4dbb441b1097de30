use super::{
    DEFAULT_PARALLEL_THRESHOLD, SlotEncoding, SlotStore, check_index,
    decay_buffer,
};
use crate::error::{Result, TimingBloomError};
use crate::ring::TickWindow;

const NIBBLE_MASK: u8 = 0x0F;

/// Shift of each slot within its byte: even slots high, odd slots low.
const NIBBLE_SHIFTS: [u32; 2] = [4, 0];

/// Byte and bit shift holding slot `index`.
#[inline]
const fn nibble_position(index: usize) -> (usize, u32) {
    (index / 2, NIBBLE_SHIFTS[index % 2])
}

#[inline]
const fn read_nibble(byte: u8, shift: u32) -> u8 {
    (byte >> shift) & NIBBLE_MASK
}

#[inline]
const fn write_nibble(byte: u8, shift: u32, value: u8) -> u8 {
    (byte & !(NIBBLE_MASK << shift)) | ((value & NIBBLE_MASK) << shift)
}

/// Two ticks per byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NibbleSlots {
    data: Vec<u8>,
    parallel_threshold: usize,
}

impl NibbleSlots {
    /// Odd slot counts are rounded up to fill the last byte.
    pub fn new(num_slots: usize) -> Result<Self> {
        Self::from_bytes(vec![0; SlotEncoding::Nibble.buffer_len(num_slots)])
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        if data.is_empty() {
            return Err(TimingBloomError::EmptyBuffer);
        }
        Ok(Self {
            data,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        })
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

fn decay_chunk(chunk: &mut [u8], window: TickWindow) -> usize {
    let mut live = 0;
    for byte in chunk.iter_mut() {
        for shift in NIBBLE_SHIFTS {
            let value = read_nibble(*byte, shift);
            if value == 0 {
                continue;
            }
            if window.is_fresh(value) {
                live += 1;
            } else {
                *byte = write_nibble(*byte, shift, 0);
            }
        }
    }
    live
}

impl SlotStore for NibbleSlots {
    fn encoding(&self) -> SlotEncoding {
        SlotEncoding::Nibble
    }

    fn num_slots(&self) -> usize {
        self.data.len() * 2
    }

    fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    fn get(&self, index: usize) -> Result<u8> {
        check_index(index, self.num_slots())?;
        let (byte, shift) = nibble_position(index);
        Ok(read_nibble(self.data[byte], shift))
    }

    #[inline]
    fn replace(&mut self, index: usize, tick: u8) -> Result<u8> {
        check_index(index, self.num_slots())?;
        let (byte, shift) = nibble_position(index);
        let previous = read_nibble(self.data[byte], shift);
        self.data[byte] = write_nibble(self.data[byte], shift, tick);
        Ok(previous)
    }

    fn decay(&mut self, window: TickWindow) -> Result<usize> {
        window.check_bounds(self.max_tick())?;
        Ok(decay_buffer(&mut self.data, self.parallel_threshold, |chunk| {
            decay_chunk(chunk, window)
        }))
    }

    fn count_live(&self) -> usize {
        self.data
            .iter()
            .map(|&byte| {
                NIBBLE_SHIFTS
                    .iter()
                    .filter(|&&shift| read_nibble(byte, shift) != 0)
                    .count()
            })
            .sum()
    }

    fn clear(&mut self) {
        self.data.fill(0);
    }
}
