use image::{GrayImage, Luma};

/// Per-pixel absolute difference of two equally sized frames.
pub fn abs_diff(frame_a: &GrayImage, frame_b: &GrayImage) -> GrayImage {
    assert!(frame_a.dimensions() == frame_b.dimensions());
    let mut ret = GrayImage::new(frame_a.width(), frame_a.height());

    for ((&mut Luma([ref mut ret_pix]), &Luma([a_pix])), &Luma([b_pix])) in
        ret.pixels_mut().zip(frame_a.pixels()).zip(frame_b.pixels())
    {
        *ret_pix = a_pix.abs_diff(b_pix);
    }

    ret
}

/// Turn a change-magnitude frame into a binary mask.
///
/// Pixels strictly brighter than `delta_threshold` become 255 and everything else 0.
/// The mask is then dilated `dilate_iterations` times with a 3x3 square so that the
/// fragments of a single moving object merge into one connected region.
pub fn change_mask(delta: &GrayImage, delta_threshold: u8, dilate_iterations: u8) -> GrayImage {
    use imageproc::contrast::ThresholdType::Binary;
    use imageproc::distance_transform::Norm::LInf;

    let mut mask = imageproc::contrast::threshold(delta, delta_threshold, Binary);
    for _ in 0..dilate_iterations {
        mask = imageproc::morphology::dilate(&mask, LInf, 1);
    }

    mask
}
