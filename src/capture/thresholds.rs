use std::{ops::RangeInclusive, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    CaptureResult, Error, DEFAULT_DELTA_THRESHOLD, DEFAULT_MAX_SIZE, DEFAULT_MIN_PHOTO_INTERVAL_S,
    DEFAULT_MIN_SIZE, DEFAULT_VIDEO_DURATION_AFTER_MOTION,
};

/// Acceptance criteria for detections, and the timings of the captures they trigger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionThresholds {
    /// Pixels whose intensity differs from the background by more than this count as changed.
    pub delta_threshold: u8,

    /// Inclusive bounds on the bounding box of the largest changed region, in pixels.
    pub min_width: u32,
    pub max_width: u32,
    pub min_height: u32,
    pub max_height: u32,

    /// Minimum time between two accepted detections.
    ///
    /// Unit: Seconds
    pub min_photo_interval_s: f64,

    /// How long video keeps recording after the triggering motion.
    ///
    /// Unit: Seconds
    pub video_duration_after_motion: f64,

    /// Whether a photo capture restarts the debounce interval. Video captures always do.
    #[serde(default = "default_rate_limit_photos")]
    pub rate_limit_photos: bool,
}

fn default_rate_limit_photos() -> bool {
    true
}

impl Default for DetectionThresholds {
    fn default() -> Self {
        Self {
            delta_threshold: DEFAULT_DELTA_THRESHOLD,
            min_width: DEFAULT_MIN_SIZE,
            max_width: DEFAULT_MAX_SIZE,
            min_height: DEFAULT_MIN_SIZE,
            max_height: DEFAULT_MAX_SIZE,
            min_photo_interval_s: DEFAULT_MIN_PHOTO_INTERVAL_S,
            video_duration_after_motion: DEFAULT_VIDEO_DURATION_AFTER_MOTION,
            rate_limit_photos: default_rate_limit_photos(),
        }
    }
}

impl DetectionThresholds {
    pub fn validate(&self) -> CaptureResult<()> {
        if self.min_width > self.max_width {
            return Err(Error::InvalidThresholds(format!(
                "min_width {} exceeds max_width {}",
                self.min_width, self.max_width
            )));
        }

        if self.min_height > self.max_height {
            return Err(Error::InvalidThresholds(format!(
                "min_height {} exceeds max_height {}",
                self.min_height, self.max_height
            )));
        }

        for (name, secs) in [
            ("min_photo_interval_s", self.min_photo_interval_s),
            ("video_duration_after_motion", self.video_duration_after_motion),
        ] {
            if !secs.is_finite() || secs < 0.0 {
                return Err(Error::InvalidThresholds(format!(
                    "{name} must be a non-negative number of seconds, got {secs}"
                )));
            }
        }

        Ok(())
    }

    /// Copy of `self` with the width and height bounds both set to `min..=max`.
    pub fn with_sensitivity(self, min: u32, max: u32) -> CaptureResult<Self> {
        let ret = Self {
            min_width: min,
            max_width: max,
            min_height: min,
            max_height: max,
            ..self
        };
        ret.validate()?;
        Ok(ret)
    }

    pub fn widths(&self) -> RangeInclusive<u32> {
        self.min_width..=self.max_width
    }

    pub fn heights(&self) -> RangeInclusive<u32> {
        self.min_height..=self.max_height
    }

    pub fn min_photo_interval(&self) -> Duration {
        Duration::from_secs_f64(self.min_photo_interval_s)
    }

    pub fn video_tail(&self) -> Duration {
        Duration::from_secs_f64(self.video_duration_after_motion)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(DetectionThresholds::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let thresholds = DetectionThresholds {
            min_height: 30,
            max_height: 29,
            ..Default::default()
        };
        assert!(matches!(
            thresholds.validate(),
            Err(Error::InvalidThresholds(_))
        ));
    }

    #[test]
    fn test_bad_durations_rejected() {
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            let thresholds = DetectionThresholds {
                video_duration_after_motion: bad,
                ..Default::default()
            };
            assert!(thresholds.validate().is_err());
        }
    }

    #[test]
    fn test_with_sensitivity_couples_bounds() {
        let thresholds = DetectionThresholds::default()
            .with_sensitivity(10, 300)
            .unwrap();

        assert_eq!(thresholds.widths(), 10..=300);
        assert_eq!(thresholds.heights(), 10..=300);
    }

    #[test]
    fn test_rate_limit_photos_defaults_on_when_missing() {
        let json = r#"{
            "delta_threshold": 25,
            "min_width": 20,
            "max_width": 400,
            "min_height": 20,
            "max_height": 400,
            "min_photo_interval_s": 2.0,
            "video_duration_after_motion": 5.0
        }"#;

        let thresholds: DetectionThresholds = serde_json::from_str(json).unwrap();

        assert!(thresholds.rate_limit_photos);
        assert_eq!(thresholds.min_photo_interval(), Duration::from_secs(2));
    }
}
