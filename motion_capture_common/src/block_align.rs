use thiserror::Error;

/// Encoders want frame widths in multiples of 32 pixels.
pub const WIDTH_BLOCK: u32 = 32;

/// ...and heights in multiples of 16.
pub const HEIGHT_BLOCK: u32 = 16;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignError {
    #[error("Block size must be non-zero")]
    ZeroBlock,

    #[error("Dimension {value} is smaller than the block size {block}")]
    TooSmall { value: u32, block: u32 },
}

/// Round `value` down to the nearest non-zero multiple of `block`.
pub fn align_down(value: u32, block: u32) -> Result<u32, AlignError> {
    if block == 0 {
        return Err(AlignError::ZeroBlock);
    }

    let aligned = (value / block) * block;
    if aligned == 0 {
        return Err(AlignError::TooSmall { value, block });
    }

    Ok(aligned)
}

/// The largest encoder-friendly resolution that fits inside `(width, height)`.
pub fn safe_resolution((width, height): (u32, u32)) -> Result<(u32, u32), AlignError> {
    Ok((
        align_down(width, WIDTH_BLOCK)?,
        align_down(height, HEIGHT_BLOCK)?,
    ))
}
