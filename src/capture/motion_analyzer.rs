use log::trace;
use motion_capture_common::{
    change_mask, fill_holes, label_regions, largest_region, region_stats, smoothed_luma, Region,
    DEFAULT_BLUR_SIGMA,
};
use serde::{Deserialize, Serialize};

use crate::{
    BackgroundModel, CaptureResult, DetectionThresholds, Frame, DEFAULT_DILATE_ITERATIONS,
};

/// Image processing settings for the [`MotionAnalyzer`]. These are fixed for the lifetime
/// of an analyzer, unlike [`DetectionThresholds`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerOptions {
    /// Sigma of the gaussian blur applied to every working frame. The default corresponds to
    /// a 21x21 kernel. Zero disables blurring.
    pub blur_sigma: f32,

    /// How many times the change mask is dilated before regions are extracted.
    pub dilate_iterations: u8,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            blur_sigma: DEFAULT_BLUR_SIGMA,
            dilate_iterations: DEFAULT_DILATE_ITERATIONS,
        }
    }
}

/// Why a frame did not produce a detection. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The frame was used to build the background model.
    Bootstrap,
    /// Nothing changed by more than the delta threshold.
    NoRegion,
    /// The largest changed region is too small or too big.
    SizeRejected(Region),
    /// The region was acceptable but arrived too soon after the previous detection.
    DebounceRejected(Region),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Analysis {
    /// The largest changed region passed the size filter. The region is informational.
    Accepted(Region),
    Rejected(Rejection),
}

/// Decides whether a frame contains meaningful motion against the running background.
#[derive(Debug, Clone, Default)]
pub struct MotionAnalyzer {
    options: AnalyzerOptions,
    background: Option<BackgroundModel>,
}

impl MotionAnalyzer {
    pub fn new(options: AnalyzerOptions) -> Self {
        Self {
            options,
            background: None,
        }
    }

    pub fn options(&self) -> AnalyzerOptions {
        self.options
    }

    pub fn is_initialized(&self) -> bool {
        self.background.is_some()
    }

    pub fn analyze(
        &mut self,
        frame: &Frame,
        thresholds: &DetectionThresholds,
    ) -> CaptureResult<Analysis> {
        let working = smoothed_luma(frame.image(), self.options.blur_sigma);

        let background = match self.background.as_mut() {
            Some(background) => background,
            None => {
                trace!("initializing background model at {:?}", working.dimensions());
                self.background = Some(BackgroundModel::initialize(&working));
                return Ok(Analysis::Rejected(Rejection::Bootstrap));
            }
        };

        let delta = background.update(&working)?;
        let mask = fill_holes(&change_mask(
            &delta,
            thresholds.delta_threshold,
            self.options.dilate_iterations,
        ));

        let stats = region_stats(&label_regions(&mask));
        let Some(largest) = largest_region(&stats) else {
            return Ok(Analysis::Rejected(Rejection::NoRegion));
        };

        let region = largest.bounding_box();
        if region.fits(thresholds.widths(), thresholds.heights()) {
            Ok(Analysis::Accepted(region))
        } else {
            Ok(Analysis::Rejected(Rejection::SizeRejected(region)))
        }
    }
}
