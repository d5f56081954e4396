use std::time::Duration;

/// The default pixel intensity difference (0-255) above which a pixel counts as changed.
/// Lower values make detection more sensitive to lighting noise.
///
/// Recommended range: 5-50.
pub const DEFAULT_DELTA_THRESHOLD: u8 = 20;

/// The default smallest width and height (in pixels) of a changed region that will trigger
/// a capture. Filters out insects, leaves, and sensor noise.
pub const DEFAULT_MIN_SIZE: u32 = 50;

/// The default largest width and height (in pixels) of a changed region that will trigger
/// a capture. Filters out whole-frame illumination changes.
pub const DEFAULT_MAX_SIZE: u32 = 500;

/// The default minimum time between two accepted detections.
///
/// Unit: Seconds
pub const DEFAULT_MIN_PHOTO_INTERVAL_S: f64 = 5.0;

/// The default time that video keeps being recorded after motion is detected.
///
/// Unit: Seconds
pub const DEFAULT_VIDEO_DURATION_AFTER_MOTION: f64 = 10.0;

/// Weight given to the newest frame when it is blended into the background model.
/// 0.5 weights history and the newest frame equally.
pub const BACKGROUND_DECAY: f32 = 0.5;

/// Number of 3x3 dilations applied to the change mask.
pub const DEFAULT_DILATE_ITERATIONS: u8 = 2;

/// How long the detection loop sleeps between checks while no session is active.
pub const DEFAULT_IDLE_POLL_INTERVAL: Duration = Duration::from_millis(50);
