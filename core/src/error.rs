use thiserror::Error;

/// Why a candidate strobe was not accepted by the aligner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PulseRejection {
    /// Minimum trails the maximum by more than the allowed peak spacing
    #[error("peak spacing {spacing} exceeds {limit} samples")]
    Geometry { spacing: isize, limit: usize },

    /// Window never crosses the neutral level
    #[error("no neutral crossing (min {min}, max {max})")]
    NoCrossing { min: i32, max: i32 },

    /// Crossing present but the excursion is too shallow
    #[error("excursion too small (min {min}, max {max})")]
    Amplitude { min: i32, max: i32 },

    /// No second strobe two cells after a sync candidate
    #[error("no confirming strobe at sample {at}")]
    Unconfirmed { at: usize },
}

#[derive(Debug, Error)]
pub enum CasTapeError {
    #[error("End of sample stream at {index} (stream holds {len} samples)")]
    EndOfStream { index: usize, len: usize },

    #[error("No synchronization pulse found")]
    SyncNotFound,

    #[error("Invalid pulse: {0}")]
    InvalidPulse(#[from] PulseRejection),
}

impl CasTapeError {
    /// True for the end-of-data signal that terminates scans and decode loops
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, CasTapeError::EndOfStream { .. })
    }
}

pub type Result<T> = std::result::Result<T, CasTapeError>;
