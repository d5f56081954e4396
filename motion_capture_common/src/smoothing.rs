use image::{GrayImage, RgbImage};

/// Gaussian sigma equivalent to a 21x21 kernel (`0.3 * ((21 - 1) / 2 - 1) + 0.8`).
pub const DEFAULT_BLUR_SIGMA: f32 = 3.5;

/// Luminance of `frame`, blurred to suppress per-pixel sensor noise.
/// A non-positive `sigma` disables the blur.
#[must_use]
pub fn smoothed_luma(frame: &RgbImage, sigma: f32) -> GrayImage {
    let gray = image::imageops::grayscale(frame);
    if sigma <= 0.0 {
        return gray;
    }

    imageproc::filter::gaussian_blur_f32(&gray, sigma)
}
