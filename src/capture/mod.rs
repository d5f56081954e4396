pub mod background_model;
pub mod clock;
pub mod collaborators;
pub mod debounce_gate;
pub mod detection_loop;
pub mod frame;
pub mod motion_analyzer;
pub mod session;
pub mod thresholds;


use thiserror::Error;

use collaborators::{PersistError, SourceError};

/// An error raised during a detection cycle or while configuring the detector.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// The background model was built from frames of a different resolution. The running
    /// detector cannot recover from this.
    #[error("Frame resolution changed from {expected:?} to {actual:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Frame source error: {0}")]
    FrameSource(#[from] SourceError),

    #[error("Persist error: {0}")]
    Persist(#[from] PersistError),

    #[error("Invalid thresholds: {0}")]
    InvalidThresholds(String),
}

impl Error {
    /// Fatal errors must stop the detection loop instead of being retried.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::DimensionMismatch { .. })
    }
}
