use std::path::{Path, PathBuf};

use motion_capture_lib::{AnalyzerOptions, DetectionThresholds};
use serde::{Deserialize, Serialize};

use crate::app::AppError;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReportVerbosity {
    Quiet,
    Default,
    Verbose,
}

// Which capture session is started once the detector is running
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SessionKindArg {
    Photo,
    Video,
}

#[derive(Debug, Clone)]
pub struct ReplayCfg {
    pub frames_dir: PathBuf,

    /// Nominal rate of the replayed frames, used to turn clip durations into frame counts.
    pub fps: f64,

    /// Frames wider than this are scaled down before detection. Stills and clips keep
    /// the full resolution.
    pub detect_width: Option<u32>,
}

/// Values given on the command line that replace the ones from the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThresholdOverrides {
    pub delta_threshold: Option<u8>,
    pub min_size: Option<u32>,
    pub max_size: Option<u32>,
    pub min_interval: Option<f64>,
    pub video_after: Option<f64>,
}

impl ThresholdOverrides {
    /// Apply everything except the size bounds, which go through
    /// [`motion_capture_lib::DetectorHandle::set_sensitivity`].
    pub fn apply(&self, thresholds: DetectionThresholds) -> DetectionThresholds {
        DetectionThresholds {
            delta_threshold: self.delta_threshold.unwrap_or(thresholds.delta_threshold),
            min_photo_interval_s: self.min_interval.unwrap_or(thresholds.min_photo_interval_s),
            video_duration_after_motion: self
                .video_after
                .unwrap_or(thresholds.video_duration_after_motion),
            ..thresholds
        }
    }

    /// The size bounds to set, if either was given. A missing bound is taken from the
    /// width bounds of `thresholds`.
    pub fn sensitivity(&self, thresholds: &DetectionThresholds) -> Option<(u32, u32)> {
        match (self.min_size, self.max_size) {
            (None, None) => None,
            (min, max) => Some((
                min.unwrap_or(thresholds.min_width),
                max.unwrap_or(thresholds.max_width),
            )),
        }
    }
}

/// Contents of the `--config` file. Either section may be left out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub thresholds: DetectionThresholds,
    pub analyzer: AnalyzerOptions,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path).map_err(|src| AppError::ConfigRead {
            path: path.to_path_buf(),
            src,
        })?;

        serde_json::from_str(&text).map_err(|src| AppError::ConfigParse {
            path: path.to_path_buf(),
            src,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AppCfg {
    pub replay_cfg: ReplayCfg,
    pub output_dir: PathBuf,

    pub session: SessionKindArg,
    pub config_path: Option<PathBuf>,
    pub overrides: ThresholdOverrides,

    pub verbosity: ReportVerbosity,
}
