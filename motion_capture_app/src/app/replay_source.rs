use std::{
    collections::VecDeque,
    ffi::OsStr,
    fmt::Display,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use image::imageops::{self, FilterType};
use itertools::Itertools;
use motion_capture_common::safe_resolution;
use motion_capture_lib::{Clock, DetectorHandle, Frame, FrameSource, SourceError};
use walkdir::WalkDir;

use crate::app::AppError;

const IMAGE_EXTS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

/// Seconds of video kept in the rolling buffer ahead of a detection.
const PRE_MOTION_SECS: f64 = 5.0;

/// Footage time of a replay: starts when the replay is opened and moves on by one frame
/// period for every frame read, however long reading it took.
#[derive(Debug)]
pub struct ReplayClock {
    start: Instant,
    fps: f64,
    frames_read: AtomicU64,
}

impl ReplayClock {
    pub fn new(fps: f64) -> Result<Self, AppError> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(AppError::InvalidFrameRate(fps));
        }

        Ok(Self {
            start: Instant::now(),
            fps,
            frames_read: AtomicU64::new(0),
        })
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    fn frame_read(&self) {
        self.frames_read.fetch_add(1, Ordering::SeqCst);
    }
}

impl Clock for ReplayClock {
    fn now(&self) -> Instant {
        let frames = self.frames_read.load(Ordering::SeqCst);
        self.start + Duration::from_secs_f64(frames as f64 / self.fps)
    }
}

/// The frames of one saved clip, oldest first.
#[derive(Debug, Clone, Default)]
pub struct ReplayClip {
    pub frames: Vec<Frame>,
}

/// Plays back a directory of still images as if they came from a camera.
///
/// Images are read in file name order. Each one is cropped to the nearest encoder-friendly
/// resolution. Reading the last image cancels the detector, so a replay runs exactly once.
pub struct ReplaySource {
    paths: Vec<PathBuf>,
    next: usize,

    clock: Arc<ReplayClock>,
    detect_width: Option<u32>,

    still: Option<Frame>,
    buffer: VecDeque<Frame>,
    buffer_capacity: usize,

    handle: DetectorHandle,
}

impl ReplaySource {
    /// `handle` should run on `clock`, so that debouncing is measured in footage time.
    pub fn new(
        frames_dir: &Path,
        clock: Arc<ReplayClock>,
        detect_width: Option<u32>,
        handle: DetectorHandle,
    ) -> Result<Self, AppError> {
        let paths = WalkDir::new(frames_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable replay entry: {e}");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(walkdir::DirEntry::into_path)
            .filter(|path| is_image(path))
            .collect_vec();

        if paths.is_empty() {
            return Err(AppError::NoFrames(frames_dir.to_path_buf()));
        }

        Ok(Self {
            paths,
            next: 0,
            buffer_capacity: frame_count(PRE_MOTION_SECS, clock.fps()).max(1),
            clock,
            detect_width,
            still: None,
            buffer: VecDeque::new(),
            handle,
        })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    fn is_exhausted(&self) -> bool {
        self.next >= self.paths.len()
    }

    // read the next image at full (aligned) resolution
    fn advance(&mut self) -> Result<Frame, SourceError> {
        let Some(path) = self.paths.get(self.next) else {
            return Err(SourceError("replay has no frames left".to_string()));
        };
        self.next += 1;
        self.clock.frame_read();

        let image = image::open(path)
            .map_err(|e| source_err(path, e))?
            .to_rgb8();
        let (width, height) = safe_resolution(image.dimensions()).map_err(|e| source_err(path, e))?;
        let frame = Frame::new(imageops::crop_imm(&image, 0, 0, width, height).to_image());

        if self.is_exhausted() {
            info!("Reached the end of the replay");
            self.handle.cancel();
        }

        self.still = Some(frame.clone());
        Ok(frame)
    }

    fn detection_frame(&self, frame: &Frame) -> Frame {
        let (width, height) = frame.dimensions();
        match self.detect_width {
            Some(target) if target > 0 && width > target => {
                let target_height = (u64::from(height) * u64::from(target) / u64::from(width)).max(1);
                Frame::new(imageops::resize(
                    frame.image(),
                    target,
                    target_height as u32,
                    FilterType::Triangle,
                ))
            }
            _ => frame.clone(),
        }
    }
}

impl FrameSource for ReplaySource {
    type Clip = ReplayClip;

    fn current_frame(&mut self) -> Result<Frame, SourceError> {
        let frame = self.advance()?;
        let detection = self.detection_frame(&frame);

        self.buffer.push_back(frame);
        while self.buffer.len() > self.buffer_capacity {
            self.buffer.pop_front();
        }

        Ok(detection)
    }

    fn current_still_frame(&mut self) -> Result<Frame, SourceError> {
        self.still
            .clone()
            .ok_or_else(|| SourceError("no frame has been read yet".to_string()))
    }

    fn buffered_stream(&mut self) -> Result<ReplayClip, SourceError> {
        Ok(ReplayClip {
            frames: self.buffer.iter().cloned().collect(),
        })
    }

    fn continue_buffering_for(&mut self, duration: Duration) -> Result<(), SourceError> {
        let wanted = frame_count(duration.as_secs_f64(), self.clock.fps());
        debug!("Buffering {wanted} more frames");

        for _ in 0..wanted {
            if self.is_exhausted() {
                debug!("Replay ended while buffering");
                break;
            }
            let frame = self.advance()?;
            self.buffer.push_back(frame);
        }

        Ok(())
    }

    fn clear_buffer(&mut self) -> Result<(), SourceError> {
        self.buffer.clear();
        Ok(())
    }

    fn release(&mut self) {
        info!(
            "Releasing replay after {} of {} frames",
            self.next.min(self.paths.len()),
            self.paths.len()
        );
        self.next = self.paths.len();
        self.buffer.clear();
        self.still = None;
    }
}

fn frame_count(secs: f64, fps: f64) -> usize {
    (secs * fps).ceil() as usize
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| IMAGE_EXTS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn source_err(path: &Path, e: impl Display) -> SourceError {
    SourceError(format!("{}: {e}", path.display()))
}
