use std::{thread::JoinHandle, time::Duration};

use log::{debug, error, info, trace};
use motion_capture_common::Region;

use crate::{
    Analysis, AnalyzerOptions, CaptureResult, ControlState, DetectionThresholds, DetectorHandle,
    FrameSource, MotionAnalyzer, Persister, Rejection, SessionMode, DEFAULT_IDLE_POLL_INTERVAL,
};

/// The result of one detection cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No session is active; no frame was read.
    Idle,
    Rejected(Rejection),
    PhotoCaptured(Region),
    VideoCaptured(Region),
}

/// Pulls frames from a [`FrameSource`], looks for motion, and hands captures to a
/// [`Persister`] according to the session mode set through its [`DetectorHandle`].
pub struct DetectionLoop<S, P> {
    source: S,
    persister: P,
    analyzer: MotionAnalyzer,
    handle: DetectorHandle,
    idle_poll_interval: Duration,
}

impl<S, P> DetectionLoop<S, P>
where
    S: FrameSource,
    P: Persister<Clip = S::Clip>,
{
    pub fn new(source: S, persister: P, handle: DetectorHandle) -> Self {
        Self {
            source,
            persister,
            analyzer: MotionAnalyzer::default(),
            handle,
            idle_poll_interval: DEFAULT_IDLE_POLL_INTERVAL,
        }
    }

    #[must_use]
    pub fn with_analyzer_options(mut self, options: AnalyzerOptions) -> Self {
        self.analyzer = MotionAnalyzer::new(options);
        self
    }

    #[must_use]
    pub fn with_idle_poll_interval(mut self, interval: Duration) -> Self {
        self.idle_poll_interval = interval;
        self
    }

    pub fn handle(&self) -> &DetectorHandle {
        &self.handle
    }

    /// Run a single detection cycle against the current session state.
    pub fn run_cycle(&mut self) -> CaptureResult<CycleOutcome> {
        let ControlState {
            session,
            thresholds,
        } = self.handle.snapshot();

        if session.mode == SessionMode::Inactive {
            return Ok(CycleOutcome::Idle);
        }

        let frame = self.source.current_frame()?;
        let region = match self.analyzer.analyze(&frame, &thresholds)? {
            Analysis::Accepted(region) => region,
            Analysis::Rejected(rejection) => {
                trace!("no detection: {rejection:?}");
                return Ok(CycleOutcome::Rejected(rejection));
            }
        };

        let now = self.handle.now();
        if !session.debounce.allow(now, thresholds.min_photo_interval()) {
            debug!("motion ({region}) too soon after the previous detection");
            return Ok(CycleOutcome::Rejected(Rejection::DebounceRejected(region)));
        }

        match session.mode {
            SessionMode::PhotoCapture => self.capture_photo(region, &thresholds),
            SessionMode::VideoCapture => self.capture_video(region, &thresholds),
            SessionMode::Inactive => Ok(CycleOutcome::Idle),
        }
    }

    fn capture_photo(
        &mut self,
        region: Region,
        thresholds: &DetectionThresholds,
    ) -> CaptureResult<CycleOutcome> {
        info!("Detected motion ({region}). Taking photo...");
        let now = self.handle.now();

        let still = self.source.current_still_frame()?;
        self.persister.save_image(still)?;

        if thresholds.rate_limit_photos {
            self.handle.record_acceptance(now);
        }
        self.handle.record_capture();

        Ok(CycleOutcome::PhotoCaptured(region))
    }

    fn capture_video(
        &mut self,
        region: Region,
        thresholds: &DetectionThresholds,
    ) -> CaptureResult<CycleOutcome> {
        info!("Detected motion ({region}). Capturing video...");

        self.source
            .continue_buffering_for(thresholds.video_tail())?;
        info!("Video capture completed");

        let clip = self.source.buffered_stream()?;
        self.persister.save_video(clip)?;
        self.source.clear_buffer()?;

        self.handle.record_acceptance(self.handle.now());
        self.handle.record_capture();
        info!("Video timer reset");

        Ok(CycleOutcome::VideoCaptured(region))
    }

    /// Run detection cycles until the handle is cancelled.
    ///
    /// Failures in a single cycle are logged and the loop carries on. The exception is a
    /// fatal error (a change of frame resolution), which releases the source and is returned.
    pub fn run(&mut self) -> CaptureResult<()> {
        info!("Change detector running");

        while !self.handle.is_cancelled() {
            match self.run_cycle() {
                Ok(CycleOutcome::Idle) => std::thread::sleep(self.idle_poll_interval),
                Ok(_) => (),
                Err(e) if e.is_fatal() => {
                    error!("Change detector stopping: {e}");
                    self.source.release();
                    return Err(e);
                }
                Err(e) => error!("Detection cycle failed: {e}"),
            }
        }

        self.source.release();
        info!("Change detector cancelled");
        Ok(())
    }

    /// Run the loop on its own thread.
    pub fn spawn(mut self) -> std::io::Result<JoinHandle<CaptureResult<()>>>
    where
        S: 'static,
        P: 'static,
    {
        std::thread::Builder::new()
            .name("motion-detector".to_string())
            .spawn(move || self.run())
    }
}
