use std::{
    collections::VecDeque,
    sync::Arc,
    time::{Duration, Instant},
};

use image::{Rgb, RgbImage};
use parking_lot::Mutex;

use motion_capture_lib::*;

const BACKGROUND: u8 = 40;
const FOREGROUND: u8 = 240;

/// A clock that only moves when told to.
#[derive(Debug)]
struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(Instant::now()),
        })
    }

    fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Event {
    CurrentFrame,
    StillFrame,
    ContinueBuffering(Duration),
    BufferedStream,
    ClearBuffer,
    Release,
    SaveImage((u32, u32)),
    SaveVideo(u32),
}

/// Shared between the fakes and the test body.
#[derive(Default)]
struct Script {
    frames: VecDeque<Result<Frame, SourceError>>,
    last: Option<Frame>,
    events: Vec<Event>,
    clips: u32,
    fail_persist: bool,
}

type SharedScript = Arc<Mutex<Script>>;

struct FakeSource {
    script: SharedScript,
    clock: Arc<ManualClock>,
    // cancel the detector once the scripted frames run out
    cancel_when_exhausted: Option<DetectorHandle>,
}

impl FrameSource for FakeSource {
    type Clip = u32;

    fn current_frame(&mut self) -> Result<Frame, SourceError> {
        let mut script = self.script.lock();
        script.events.push(Event::CurrentFrame);
        match script.frames.pop_front() {
            Some(Ok(frame)) => {
                script.last = Some(frame.clone());
                Ok(frame)
            }
            Some(Err(e)) => Err(e),
            None => {
                if let Some(handle) = &self.cancel_when_exhausted {
                    handle.cancel();
                    return Err(SourceError("no more frames".to_string()));
                }
                script
                    .last
                    .clone()
                    .ok_or_else(|| SourceError("no frames scripted".to_string()))
            }
        }
    }

    fn current_still_frame(&mut self) -> Result<Frame, SourceError> {
        let mut script = self.script.lock();
        script.events.push(Event::StillFrame);
        script
            .last
            .clone()
            .ok_or_else(|| SourceError("no still available".to_string()))
    }

    fn buffered_stream(&mut self) -> Result<u32, SourceError> {
        let mut script = self.script.lock();
        script.events.push(Event::BufferedStream);
        script.clips += 1;
        Ok(script.clips)
    }

    fn continue_buffering_for(&mut self, duration: Duration) -> Result<(), SourceError> {
        self.script
            .lock()
            .events
            .push(Event::ContinueBuffering(duration));
        self.clock.advance(duration);
        Ok(())
    }

    fn clear_buffer(&mut self) -> Result<(), SourceError> {
        self.script.lock().events.push(Event::ClearBuffer);
        Ok(())
    }

    fn release(&mut self) {
        self.script.lock().events.push(Event::Release);
    }
}

struct FakePersister {
    script: SharedScript,
}

impl Persister for FakePersister {
    type Clip = u32;

    fn save_image(&mut self, frame: Frame) -> Result<(), PersistError> {
        let mut script = self.script.lock();
        if script.fail_persist {
            return Err(PersistError("disk full".to_string()));
        }
        script.events.push(Event::SaveImage(frame.dimensions()));
        Ok(())
    }

    fn save_video(&mut self, clip: u32) -> Result<(), PersistError> {
        let mut script = self.script.lock();
        if script.fail_persist {
            return Err(PersistError("disk full".to_string()));
        }
        script.events.push(Event::SaveVideo(clip));
        Ok(())
    }
}

struct Rig {
    script: SharedScript,
    clock: Arc<ManualClock>,
    handle: DetectorHandle,
    detector: DetectionLoop<FakeSource, FakePersister>,
}

impl Rig {
    fn new(thresholds: DetectionThresholds) -> Self {
        Self::build(thresholds, false)
    }

    fn cancelling_when_exhausted(thresholds: DetectionThresholds) -> Self {
        Self::build(thresholds, true)
    }

    fn build(thresholds: DetectionThresholds, cancel_when_exhausted: bool) -> Self {
        let script = SharedScript::default();
        let clock = ManualClock::new();
        let handle = DetectorHandle::with_clock(thresholds, clock.clone()).unwrap();

        let source = FakeSource {
            script: script.clone(),
            clock: clock.clone(),
            cancel_when_exhausted: cancel_when_exhausted.then(|| handle.clone()),
        };
        let persister = FakePersister {
            script: script.clone(),
        };
        let detector = DetectionLoop::new(source, persister, handle.clone())
            .with_idle_poll_interval(Duration::from_millis(1));

        Self {
            script,
            clock,
            handle,
            detector,
        }
    }

    fn push(&self, frame: Frame) {
        self.script.lock().frames.push_back(Ok(frame));
    }

    fn push_err(&self, msg: &str) {
        self.script
            .lock()
            .frames
            .push_back(Err(SourceError(msg.to_string())));
    }

    fn cycle(&mut self, frame: Frame) -> CaptureResult<CycleOutcome> {
        self.push(frame);
        self.detector.run_cycle()
    }

    fn events(&self) -> Vec<Event> {
        self.script.lock().events.clone()
    }
}

fn thresholds() -> DetectionThresholds {
    DetectionThresholds {
        delta_threshold: 25,
        min_width: 20,
        max_width: 400,
        min_height: 20,
        max_height: 400,
        min_photo_interval_s: 2.0,
        video_duration_after_motion: 3.0,
        rate_limit_photos: true,
    }
}

fn scene(width: u32, height: u32, square: Option<(u32, u32, u32)>) -> Frame {
    let image = RgbImage::from_fn(width, height, |x, y| match square {
        Some((sx, sy, size)) if (sx..sx + size).contains(&x) && (sy..sy + size).contains(&y) => {
            Rgb([FOREGROUND; 3])
        }
        _ => Rgb([BACKGROUND; 3]),
    });
    Frame::new(image)
}

fn background() -> Frame {
    scene(100, 100, None)
}

fn with_square() -> Frame {
    scene(100, 100, Some((25, 25, 50)))
}

fn is_region_around_square(region: Region) -> bool {
    (50..=70).contains(&region.width) && (50..=70).contains(&region.height)
}

#[test]
fn test_four_cycle_scenario() {
    let mut rig = Rig::new(thresholds());
    rig.handle.start_photo();

    let c1 = rig.cycle(background()).unwrap();
    assert_eq!(c1, CycleOutcome::Rejected(Rejection::Bootstrap));

    let c2 = rig.cycle(background()).unwrap();
    assert_eq!(c2, CycleOutcome::Rejected(Rejection::NoRegion));

    let c3 = rig.cycle(with_square()).unwrap();
    let CycleOutcome::PhotoCaptured(region) = c3 else {
        panic!("expected a photo, got {c3:?}");
    };
    assert!(is_region_around_square(region), "{region}");

    let c4 = rig.cycle(with_square()).unwrap();
    assert!(
        matches!(c4, CycleOutcome::Rejected(Rejection::DebounceRejected(_))),
        "{c4:?}"
    );

    let saves = rig
        .events()
        .into_iter()
        .filter(|e| matches!(e, Event::SaveImage(_)))
        .collect::<Vec<_>>();
    assert_eq!(saves, vec![Event::SaveImage((100, 100))]);
    assert_eq!(rig.handle.captures(), 1);
}

#[test]
fn test_photo_allowed_again_after_interval() {
    let mut rig = Rig::new(thresholds());
    rig.handle.start_photo();

    rig.cycle(background()).unwrap();
    let first = rig.cycle(with_square()).unwrap();
    assert!(matches!(first, CycleOutcome::PhotoCaptured(_)));

    // something else moves, too soon
    rig.clock.advance(Duration::from_millis(1900));
    let soon = rig.cycle(scene(100, 100, Some((0, 0, 30)))).unwrap();
    assert!(matches!(
        soon,
        CycleOutcome::Rejected(Rejection::DebounceRejected(_))
    ));

    // and again once the interval has passed
    rig.clock.advance(Duration::from_millis(100));
    let later = rig.cycle(scene(100, 100, Some((60, 60, 35)))).unwrap();
    assert!(matches!(later, CycleOutcome::PhotoCaptured(_)), "{later:?}");
    assert_eq!(rig.handle.captures(), 2);
}

#[test]
fn test_photos_not_rate_limited_when_disabled() {
    let mut rig = Rig::new(DetectionThresholds {
        rate_limit_photos: false,
        ..thresholds()
    });
    rig.handle.start_photo();

    rig.cycle(background()).unwrap();
    let first = rig.cycle(with_square()).unwrap();
    let second = rig.cycle(with_square()).unwrap();

    assert!(matches!(first, CycleOutcome::PhotoCaptured(_)));
    assert!(matches!(second, CycleOutcome::PhotoCaptured(_)));
    assert_eq!(rig.handle.snapshot().session.debounce.last_accepted(), None);
}

#[test]
fn test_video_capture_sequence() {
    let mut rig = Rig::new(thresholds());
    rig.handle.start_video();
    let t0 = rig.clock.now();

    rig.cycle(background()).unwrap();
    let outcome = rig.cycle(with_square()).unwrap();

    assert!(matches!(outcome, CycleOutcome::VideoCaptured(_)));
    assert_eq!(
        rig.events(),
        vec![
            Event::CurrentFrame,
            Event::CurrentFrame,
            Event::ContinueBuffering(Duration::from_secs(3)),
            Event::BufferedStream,
            Event::SaveVideo(1),
            Event::ClearBuffer,
        ]
    );

    // the debounce timer restarts when the clip is done, not when the motion was seen
    let last = rig.handle.snapshot().session.debounce.last_accepted();
    assert_eq!(last, Some(t0 + Duration::from_secs(3)));

    let again = rig.cycle(with_square()).unwrap();
    assert!(matches!(
        again,
        CycleOutcome::Rejected(Rejection::DebounceRejected(_))
    ));
}

#[test]
fn test_inactive_does_not_touch_source() {
    let mut rig = Rig::new(thresholds());

    rig.push(background());
    assert_eq!(rig.detector.run_cycle().unwrap(), CycleOutcome::Idle);

    rig.handle.start_photo();
    rig.handle.stop();
    assert_eq!(rig.detector.run_cycle().unwrap(), CycleOutcome::Idle);

    assert!(rig.events().is_empty());
}

#[test]
fn test_sensitivity_applies_to_next_cycle() {
    let mut rig = Rig::new(thresholds());
    rig.handle.start_photo();

    rig.cycle(background()).unwrap();
    rig.handle.set_sensitivity(100, 400).unwrap();

    let outcome = rig.cycle(with_square()).unwrap();
    assert!(
        matches!(
            outcome,
            CycleOutcome::Rejected(Rejection::SizeRejected(region)) if is_region_around_square(region)
        ),
        "{outcome:?}"
    );
}

#[test]
fn test_source_failure_is_not_fatal() {
    let mut rig = Rig::new(thresholds());
    rig.handle.start_photo();

    rig.push_err("usb hiccup");
    let err = rig.detector.run_cycle().unwrap_err();
    assert!(matches!(err, Error::FrameSource(_)));
    assert!(!err.is_fatal());

    assert_eq!(
        rig.cycle(background()).unwrap(),
        CycleOutcome::Rejected(Rejection::Bootstrap)
    );
}

#[test]
fn test_persist_failure_does_not_start_debounce() {
    let mut rig = Rig::new(thresholds());
    rig.handle.start_photo();

    rig.cycle(background()).unwrap();
    rig.script.lock().fail_persist = true;

    let err = rig.cycle(with_square()).unwrap_err();
    assert!(matches!(err, Error::Persist(_)));
    assert_eq!(rig.handle.snapshot().session.debounce.last_accepted(), None);
    assert_eq!(rig.handle.captures(), 0);
}

#[test]
fn test_run_survives_failures_until_cancelled() {
    let mut rig = Rig::cancelling_when_exhausted(thresholds());
    rig.handle.start_photo();

    rig.push_err("first read failed");
    rig.push(background());
    rig.push_err("transient");
    rig.push(with_square());

    rig.detector.run().unwrap();

    let events = rig.events();
    assert!(events.contains(&Event::SaveImage((100, 100))));
    assert_eq!(events.last(), Some(&Event::Release));
    assert!(rig.handle.is_cancelled());
    assert_eq!(rig.handle.captures(), 1);
}

#[test]
fn test_run_escalates_resolution_change() {
    let mut rig = Rig::cancelling_when_exhausted(thresholds());
    rig.handle.start_photo();

    rig.push(scene(64, 48, None));
    rig.push(scene(48, 64, None));
    rig.push(scene(64, 48, None));

    let err = rig.detector.run().unwrap_err();

    assert!(matches!(
        err,
        Error::DimensionMismatch {
            expected: (64, 48),
            actual: (48, 64)
        }
    ));
    assert_eq!(rig.events().last(), Some(&Event::Release));
    assert!(!rig.handle.is_cancelled());
}

#[test]
fn test_spawned_loop_stops_on_cancel() {
    let rig = Rig::new(thresholds());
    rig.push(background());
    rig.handle.start_photo();

    let handle = rig.handle.clone();
    let script = rig.script.clone();
    let join = rig.detector.spawn().unwrap();

    std::thread::sleep(Duration::from_millis(20));
    handle.stop();
    std::thread::sleep(Duration::from_millis(20));
    handle.cancel();

    join.join().unwrap().unwrap();
    assert_eq!(script.lock().events.last(), Some(&Event::Release));
}
