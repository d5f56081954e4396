use image::{GrayImage, ImageBuffer, Luma};
use motion_capture_common::abs_diff;

use crate::{CaptureResult, Error, BACKGROUND_DECAY};

type GrayImageF32 = ImageBuffer<Luma<f32>, Vec<f32>>;

/// A running average of past (smoothed, grayscale) frames, used as the reference that
/// new frames are compared against.
///
/// Blending every frame in with equal weight to the history suppresses single-frame noise
/// and flicker, while slow changes such as drifting shadows are absorbed after a few frames.
#[derive(Debug, Clone)]
pub struct BackgroundModel {
    acc: GrayImageF32,
}

impl BackgroundModel {
    /// Start a model whose reference is exactly `frame`.
    pub fn initialize(frame: &GrayImage) -> Self {
        let acc = GrayImageF32::from_fn(frame.width(), frame.height(), |x, y| {
            let Luma([pix]) = *frame.get_pixel(x, y);
            Luma([f32::from(pix)])
        });

        Self { acc }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.acc.dimensions()
    }

    /// Blend `frame` into the model, then return how far `frame` is from the updated
    /// reference at each pixel.
    pub fn update(&mut self, frame: &GrayImage) -> CaptureResult<GrayImage> {
        if frame.dimensions() != self.dimensions() {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions(),
                actual: frame.dimensions(),
            });
        }

        for (&Luma([pix]), &mut Luma([ref mut acc_pix])) in
            frame.pixels().zip(self.acc.pixels_mut())
        {
            *acc_pix = (1.0 - BACKGROUND_DECAY) * *acc_pix + BACKGROUND_DECAY * f32::from(pix);
        }

        Ok(abs_diff(frame, &self.reference()))
    }

    /// The model rounded back to 8 bit intensities.
    pub fn reference(&self) -> GrayImage {
        let mut ret = GrayImage::new(self.acc.width(), self.acc.height());

        for (&mut Luma([ref mut ret_pix]), &Luma([acc_pix])) in
            ret.pixels_mut().zip(self.acc.pixels())
        {
            *ret_pix = acc_pix.abs().round().clamp(0.0, f32::from(u8::MAX)) as u8;
        }

        ret
    }
}
