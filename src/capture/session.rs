use std::{
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};

use log::{info, warn};
use parking_lot::Mutex;

use crate::{CaptureResult, Clock, DebounceGate, DetectionThresholds, SystemClock};

/// What the detector does with an accepted detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionMode {
    /// Not armed. Frames are not inspected.
    #[default]
    Inactive,
    /// Take a full resolution still.
    PhotoCapture,
    /// Save the buffered video plus a tail recorded after the motion.
    VideoCapture,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionState {
    pub mode: SessionMode,

    /// When the mode last changed (including restarts of the same mode).
    pub session_start_time: Option<Instant>,

    pub debounce: DebounceGate,
}

/// Everything the detection loop reads from the control plane. Copied out as a whole at
/// the start of each cycle so that paired values are never seen half-updated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlState {
    pub session: SessionState,
    pub thresholds: DetectionThresholds,
}

/// The control surface of a running detector. Cheap to clone and safe to use from any
/// thread while the detection loop runs.
#[derive(Clone)]
pub struct DetectorHandle {
    control: Arc<Mutex<ControlState>>,
    cancelled: Arc<AtomicBool>,
    captures: Arc<AtomicU64>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for DetectorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorHandle")
            .field("control", &*self.control.lock())
            .field("cancelled", &self.is_cancelled())
            .field("captures", &self.captures())
            .finish_non_exhaustive()
    }
}

impl DetectorHandle {
    pub fn new(thresholds: DetectionThresholds) -> CaptureResult<Self> {
        Self::with_clock(thresholds, Arc::new(SystemClock))
    }

    pub fn with_clock(
        thresholds: DetectionThresholds,
        clock: Arc<dyn Clock>,
    ) -> CaptureResult<Self> {
        thresholds.validate()?;

        info!("Change detector set up");
        Ok(Self {
            control: Arc::new(Mutex::new(ControlState {
                session: SessionState::default(),
                thresholds,
            })),
            cancelled: Arc::new(AtomicBool::new(false)),
            captures: Arc::new(AtomicU64::new(0)),
            clock,
        })
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    pub fn start_photo(&self) {
        info!("Starting photo capture session");
        self.set_mode(SessionMode::PhotoCapture);
    }

    pub fn start_video(&self) {
        info!("Starting video capture session");
        self.set_mode(SessionMode::VideoCapture);
    }

    pub fn stop(&self) {
        info!("Ending capture session");
        self.set_mode(SessionMode::Inactive);
    }

    fn set_mode(&self, mode: SessionMode) {
        let now = self.now();
        let mut control = self.control.lock();
        control.session.mode = mode;
        control.session.session_start_time = Some(now);
    }

    /// Set the accepted region size to `min..=max` pixels, for width and height alike.
    pub fn set_sensitivity(&self, min: u32, max: u32) -> CaptureResult<()> {
        let mut control = self.control.lock();
        match control.thresholds.with_sensitivity(min, max) {
            Ok(thresholds) => {
                info!("Sensitivity set to {min}..={max} pixels");
                control.thresholds = thresholds;
                Ok(())
            }
            Err(e) => {
                warn!("Ignoring sensitivity update: {e}");
                Err(e)
            }
        }
    }

    /// Ask the detection loop to stop. It notices at the top of its next iteration and then
    /// releases the frame source.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> ControlState {
        *self.control.lock()
    }

    pub fn mode(&self) -> SessionMode {
        self.control.lock().session.mode
    }

    pub fn thresholds(&self) -> DetectionThresholds {
        self.control.lock().thresholds
    }

    pub fn session_start_time(&self) -> Option<Instant> {
        self.control.lock().session.session_start_time
    }

    /// Number of photos and clips handed to the persister so far.
    pub fn captures(&self) -> u64 {
        self.captures.load(Ordering::Relaxed)
    }

    pub(crate) fn record_acceptance(&self, now: Instant) {
        self.control.lock().session.debounce.record(now);
    }

    pub(crate) fn record_capture(&self) {
        self.captures.fetch_add(1, Ordering::Relaxed);
    }
}
