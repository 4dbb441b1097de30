//! Timing bloom filter: set membership with automatic expiry.
//!
//! Every slot of the filter remembers the tick at which it was last set
//! instead of a single bit. A logical clock maps wall time onto a small ring
//! of ticks, and a key counts as present only while all of its slots carry a
//! tick inside the current freshness window. Nothing is ever deleted
//! explicitly; a periodic decay pass zeroes slots that fell out of the window
//! so they can be reused.
//!
//! Layers:
//!    * [`ring`]: the `(min, max]` freshness window over a wrapping tick ring.
//!    * [`slots`]: byte and nibble slot buffers with the add / contains /
//!      decay primitives.
//!    * [`clock`], [`hash`], [`config`]: ticks from timestamps, slot indexes
//!      from keys, sizing from capacity and error rate.
//!    * [`TimingBloomFilter`]: the keyed filter tying them together.
//!
//! Trade-offs:
//!    * Nibble slots halve memory but only distinguish 15 ticks, so expiry
//!      happens in coarser steps of `decay_time / 7`.
//!    * Stores are single-writer; wrap the filter in a lock to share it.

pub mod clock;
pub mod config;
mod error;
mod filter;
pub mod hash;
pub mod ring;
pub mod slots;
#[cfg(feature = "ticker")]
pub mod ticker;

pub use clock::TickClock;
pub use config::{
    FilterParams, TimingFilterConfig, TimingFilterConfigBuilder,
    TimingFilterConfigBuilderError,
};
pub use error::{Result, TimingBloomError};
pub use filter::TimingBloomFilter;
pub use hash::{SlotIndexes, optimal_num_hashes, optimal_num_slots, slot_indexes};
pub use ring::TickWindow;
pub use slots::{ByteSlots, NibbleSlots, SlotEncoding, SlotStore, Slots};
#[cfg(feature = "ticker")]
pub use ticker::{DecayTicker, spawn_decay_ticker, spawn_default_decay_ticker};
