use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use timing_bloom::{SlotEncoding, SlotStore, Slots};
use tracing_subscriber::EnvFilter;

/// Routes `tracing` output to the test harness; set RUST_LOG to see it.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Both encodings over the same number of slots.
#[allow(dead_code)]
pub fn both_encodings(num_slots: usize) -> [Slots; 2] {
    [
        Slots::new(SlotEncoding::Byte, num_slots).unwrap(),
        Slots::new(SlotEncoding::Nibble, num_slots).unwrap(),
    ]
}

#[allow(dead_code)]
pub fn generate_test_items(count: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|i| format!("test_item_{:06}", i).into_bytes())
        .collect()
}

/// Index source that records how far it was consumed and whether it was
/// released.
#[allow(dead_code)]
pub struct TrackedIndexes {
    inner: std::vec::IntoIter<usize>,
    pulled: Arc<AtomicUsize>,
    dropped: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl TrackedIndexes {
    pub fn new(indexes: Vec<usize>) -> (Self, Arc<AtomicUsize>, Arc<AtomicBool>) {
        let pulled = Arc::new(AtomicUsize::new(0));
        let dropped = Arc::new(AtomicBool::new(false));
        let tracked = Self {
            inner: indexes.into_iter(),
            pulled: Arc::clone(&pulled),
            dropped: Arc::clone(&dropped),
        };
        (tracked, pulled, dropped)
    }
}

impl Iterator for TrackedIndexes {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let next = self.inner.next();
        if next.is_some() {
            self.pulled.fetch_add(1, Ordering::SeqCst);
        }
        next
    }
}

impl Drop for TrackedIndexes {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}

/// Snapshot of every slot value, independent of the encoding.
#[allow(dead_code)]
pub fn slot_values(slots: &Slots) -> Vec<u8> {
    (0..slots.num_slots())
        .map(|index| slots.get(index).unwrap())
        .collect()
}
