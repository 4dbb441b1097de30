use super::{
    DEFAULT_PARALLEL_THRESHOLD, SlotEncoding, SlotStore, check_index,
    decay_buffer,
};
use crate::error::{Result, TimingBloomError};
use crate::ring::TickWindow;

/// One tick per byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteSlots {
    data: Vec<u8>,
    parallel_threshold: usize,
}

impl ByteSlots {
    pub fn new(num_slots: usize) -> Result<Self> {
        Self::from_bytes(vec![0; num_slots])
    }

    /// Wraps an existing buffer; every byte is a valid slot value.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        if data.is_empty() {
            return Err(TimingBloomError::EmptyBuffer);
        }
        Ok(Self {
            data,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        })
    }

    /// Buffer length from which `decay` fans out to the rayon pool.
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
    for value in chunk.iter_mut() {
        // all-ones mask keeps the slot, zero mask expires it
        let keep = u8::from(window.is_live(*value));
        *value &= keep.wrapping_neg();
        live += usize::from(keep);
    }
    live
}

impl SlotStore for ByteSlots {
    fn encoding(&self) -> SlotEncoding {
        SlotEncoding::Byte
    }

    fn num_slots(&self) -> usize {
        self.data.len()
    }

    fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    fn get(&self, index: usize) -> Result<u8> {
        check_index(index, self.data.len())?;
        Ok(self.data[index])
    }

    #[inline]
    fn replace(&mut self, index: usize, tick: u8) -> Result<u8> {
        check_index(index, self.data.len())?;
        Ok(std::mem::replace(&mut self.data[index], tick))
    }

    fn decay(&mut self, window: TickWindow) -> Result<usize> {
        window.check_bounds(self.max_tick())?;
        Ok(decay_buffer(&mut self.data, self.parallel_threshold, |chunk| {
            decay_chunk(chunk, window)
        }))
    }

    fn count_live(&self) -> usize {
        self.data.iter().filter(|&&value| value != 0).count()
    }

    fn clear(&mut self) {
        self.data.fill(0);
    }
}
