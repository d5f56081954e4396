use image::{buffer::ConvertBuffer, GrayImage, RgbImage};

/// A single video frame as delivered by a [`crate::FrameSource`].
///
/// The RGB original is kept untouched so it can be handed to a [`crate::Persister`];
/// the grayscale working copy used for detection is derived from it on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    /// Build a frame from a grayscale image, e.g. from a monochrome sensor.
    pub fn from_luma(image: &GrayImage) -> Self {
        Self {
            image: image.convert(),
        }
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    #[must_use]
    pub fn into_inner(self) -> RgbImage {
        self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

impl From<RgbImage> for Frame {
    fn from(image: RgbImage) -> Self {
        Self::new(image)
    }
}
