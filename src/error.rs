use thiserror::Error;

pub type Result<T> = std::result::Result<T, TimingBloomError>;

#[derive(Error, Debug)]
pub enum TimingBloomError {
    #[error("Index out of bounds: {index} >= {num_slots}")]
    IndexOutOfBounds { index: usize, num_slots: usize },

    #[error("Tick 0 is reserved for empty slots")]
    SentinelTick,

    #[error("Tick out of range: {tick} > {max_tick}")]
    TickOutOfRange { tick: u8, max_tick: u8 },

    #[error("Slot buffer must hold at least one byte")]
    EmptyBuffer,

    #[error("Malformed slot buffer: {0}")]
    MalformedBuffer(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("SystemTime error: {0}")]
    SystemTimeError(#[from] std::time::SystemTimeError),
}

impl TimingBloomError {
    /// Argument errors: bad index, bad tick, unaddressable buffer or config.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::IndexOutOfBounds { .. }
                | Self::SentinelTick
                | Self::TickOutOfRange { .. }
                | Self::EmptyBuffer
                | Self::InvalidConfig(_)
        )
    }

    pub fn is_malformed_input(&self) -> bool {
        matches!(self, Self::MalformedBuffer(_))
    }
}

// Config validation reports plain strings
impl From<String> for TimingBloomError {
    fn from(msg: String) -> Self {
        TimingBloomError::InvalidConfig(msg)
    }
}
