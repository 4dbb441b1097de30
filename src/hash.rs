use fnv::FnvHasher;
use murmur3::murmur3_32;
use std::hash::Hasher;
use std::io::Cursor;
use std::iter::FusedIterator;

pub(crate) fn hash_murmur32(key: &[u8]) -> u32 {
    let mut cursor = Cursor::new(key);
    murmur3_32(&mut cursor, 0).expect("Failed to compute Murmur3 hash")
}

pub(crate) fn hash_fnv32(key: &[u8]) -> u32 {
    let mut hasher = FnvHasher::default();
    hasher.write(key);
    hasher.finish() as u32
}

/// Lazily generated slot indexes for one key.
///
/// Uses double hashing, `h1 + i * h2 mod num_slots`, with murmur3 and FNV as
/// the two base hashes. Nothing is allocated; the slot store pulls indexes
/// one at a time and may stop early.
#[derive(Debug, Clone)]
pub struct SlotIndexes {
    h1: u64,
    h2: u64,
    next: usize,
    num_hashes: usize,
    num_slots: u64,
}

impl Iterator for SlotIndexes {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.next >= self.num_hashes {
            return None;
        }
        let i = self.next as u64;
        self.next += 1;
        let combined = self.h1.wrapping_add(i.wrapping_mul(self.h2));
        Some((combined % self.num_slots) as usize)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.num_hashes - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SlotIndexes {}

impl FusedIterator for SlotIndexes {}

/// Slot indexes probed for `item` in a filter of `num_slots` slots.
///
/// `num_slots` must be non-zero.
pub fn slot_indexes(
    item: &[u8],
    num_hashes: usize,
    num_slots: usize,
) -> SlotIndexes {
    SlotIndexes {
        h1: u64::from(hash_murmur32(item)),
        h2: u64::from(hash_fnv32(item)),
        next: 0,
        num_hashes,
        num_slots: num_slots as u64,
    }
}

/// Slots needed to hold `n` items at false positive rate `fpr`.
pub fn optimal_num_slots(n: usize, fpr: f64) -> usize {
    let ln2 = std::f64::consts::LN_2;
    ((-(n as f64) * fpr.ln()) / (ln2 * ln2)).ceil() as usize
}

/// Hash functions minimizing the false positive rate for `n` items in `m`
/// slots. Never less than one.
pub fn optimal_num_hashes(n: usize, m: usize) -> usize {
    (((m as f64 / n as f64) * std::f64::consts::LN_2).round() as usize).max(1)
}
