#![allow(clippy::let_and_return)]
#![allow(clippy::len_without_is_empty)]
#![warn(clippy::cast_lossless)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::todo)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::unimplemented)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::panic)]
#![allow(clippy::doc_markdown)]

//! # Overview
//! `motion_capture_lib` is the motion-triggered capture engine of an unattended camera.
//! It watches a stream of frames for meaningful scene change, and when it sees some it takes
//! a photo or saves a video clip.
//!
//! The camera and the storage are not part of this crate. Supply them by implementing
//! [`FrameSource`] and [`Persister`].
//!
//! # High Level API
//! Create a [`DetectorHandle`] from a set of [`DetectionThresholds`], build a
//! [`DetectionLoop`] around your frame source and persister, and spawn it. The handle
//! arms and disarms the detector from any thread.
//!
//! ```rust,no_run
//! # use motion_capture_lib::*;
//! # fn go<S, P>(camera: S, storage: P) -> CaptureResult<()>
//! # where S: FrameSource + 'static, P: Persister<Clip = S::Clip> + 'static {
//! let handle = DetectorHandle::new(DetectionThresholds::default())?;
//! let detector = DetectionLoop::new(camera, storage, handle.clone());
//! let join = detector.spawn().expect("failed to spawn the detection thread");
//!
//! handle.start_photo();
//! // ... later
//! handle.set_sensitivity(30, 400)?;
//! handle.cancel();
//! join.join().expect("detection thread panicked")?;
//! # Ok(())
//! # }
//! ```
//!
//! The analysis can also be used on its own:
//! ```rust
//! use image::{Rgb, RgbImage};
//! use motion_capture_lib::{Analysis, DetectionThresholds, Frame, MotionAnalyzer, Rejection};
//!
//! let thresholds = DetectionThresholds::default();
//! let mut analyzer = MotionAnalyzer::default();
//! let frame = Frame::new(RgbImage::from_pixel(64, 48, Rgb([90, 90, 90])));
//!
//! // The first frame only builds the background.
//! let analysis = analyzer.analyze(&frame, &thresholds).unwrap();
//! assert_eq!(analysis, Analysis::Rejected(Rejection::Bootstrap));
//!
//! // A static scene never moves.
//! let analysis = analyzer.analyze(&frame, &thresholds).unwrap();
//! assert_eq!(analysis, Analysis::Rejected(Rejection::NoRegion));
//! ```
//!
//! # How it works
//! Each frame is converted to grayscale and blurred with a wide gaussian (about 21x21 pixels)
//! to remove sensor noise. The result is blended into a running background average with
//! weight 0.5, and the absolute difference between the frame and the updated average is
//! thresholded into a binary mask. The mask is dilated so the pieces of one moving object join
//! up, holes inside changed areas are filled in, and the bounding box of the largest
//! connected region is compared against the configured size bounds. Small regions (noise,
//! insects) and huge ones (lights turning on) are ignored.
//!
//! Detections that pass are rate limited by a debounce interval, then trigger a capture
//! according to the session mode:
//! * Photo: a full resolution still is taken from the frame source and persisted.
//! * Video: the source keeps recording for a while after the motion, then the buffered clip
//!   is persisted and the buffer cleared.
//!
//! # Errors
//! Nothing that happens during a single cycle stops the detection loop, except a change in
//! frame resolution: the background model cannot be compared against frames of a different
//! size, so [`Error::DimensionMismatch`] ends [`DetectionLoop::run`].

mod capture;
mod definitions;

pub use capture::{
    background_model::BackgroundModel,
    clock::{Clock, SystemClock},
    collaborators::{FrameSource, PersistError, Persister, SourceError},
    debounce_gate::DebounceGate,
    detection_loop::{CycleOutcome, DetectionLoop},
    frame::Frame,
    motion_analyzer::{Analysis, AnalyzerOptions, MotionAnalyzer, Rejection},
    session::{ControlState, DetectorHandle, SessionMode, SessionState},
    thresholds::DetectionThresholds,
    Error,
};

pub use definitions::{
    BACKGROUND_DECAY, DEFAULT_DELTA_THRESHOLD, DEFAULT_DILATE_ITERATIONS,
    DEFAULT_IDLE_POLL_INTERVAL, DEFAULT_MAX_SIZE, DEFAULT_MIN_PHOTO_INTERVAL_S, DEFAULT_MIN_SIZE,
    DEFAULT_VIDEO_DURATION_AFTER_MOTION,
};

pub use motion_capture_common::Region;

pub type CaptureResult<T> = Result<T, crate::Error>;
