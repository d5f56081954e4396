//! The camera-side and storage-side collaborators of the detector.

use std::time::Duration;

use thiserror::Error;

use crate::Frame;

/// A failure reported by a [`FrameSource`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct SourceError(pub String);

/// A failure reported by a [`Persister`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct PersistError(pub String);

/// Supplies frames to the detection loop and owns the rolling video buffer.
pub trait FrameSource: Send {
    /// A buffered stretch of video, opaque to the detector.
    type Clip;

    /// The latest frame at detection resolution.
    fn current_frame(&mut self) -> Result<Frame, SourceError>;

    /// The latest frame at full resolution, for persisting as a photo.
    fn current_still_frame(&mut self) -> Result<Frame, SourceError>;

    /// The video buffered so far.
    fn buffered_stream(&mut self) -> Result<Self::Clip, SourceError>;

    /// Keep recording into the buffer for `duration`. Blocks until done.
    fn continue_buffering_for(&mut self, duration: Duration) -> Result<(), SourceError>;

    fn clear_buffer(&mut self) -> Result<(), SourceError>;

    /// Give the underlying device back. Called once, when the detection loop exits.
    fn release(&mut self);
}

/// Writes captured photos and clips to storage.
pub trait Persister: Send {
    type Clip;

    fn save_image(&mut self, frame: Frame) -> Result<(), PersistError>;

    fn save_video(&mut self, clip: Self::Clip) -> Result<(), PersistError>;
}
