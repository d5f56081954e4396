use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box in frame coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    #[must_use]
    pub fn from_topleft_and_dims(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a region from inclusive pixel corners.
    #[must_use]
    pub fn from_corners((min_x, min_y): (u32, u32), (max_x, max_y): (u32, u32)) -> Self {
        assert!(min_x <= max_x && min_y <= max_y);
        Self {
            x: min_x,
            y: min_y,
            width: (max_x - min_x) + 1,
            height: (max_y - min_y) + 1,
        }
    }

    #[must_use]
    pub fn as_view_args(&self) -> (u32, u32, u32, u32) {
        (self.x, self.y, self.width, self.height)
    }

    pub fn area(&self) -> u32 {
        self.width * self.height
    }

    /// True if both dimensions fall inside their (inclusive) bounds.
    pub fn fits(&self, widths: RangeInclusive<u32>, heights: RangeInclusive<u32>) -> bool {
        widths.contains(&self.width) && heights.contains(&self.height)
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}x{} at ({}, {})",
            self.width, self.height, self.x, self.y
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_corners_single_pixel() {
        let region = Region::from_corners((4, 7), (4, 7));
        assert_eq!(region.as_view_args(), (4, 7, 1, 1));
    }

    #[test]
    fn test_from_corners_matches_topleft_and_dims() {
        let a = Region::from_corners((11, 12), (23, 25));
        let b = Region::from_topleft_and_dims(11, 12, 13, 14);
        assert_eq!(a, b);
        assert_eq!(a.area(), 13 * 14);
    }

    #[test]
    fn test_fits_is_inclusive() {
        let region = Region::from_topleft_and_dims(0, 0, 20, 400);
        assert!(region.fits(20..=400, 20..=400));
        assert!(!region.fits(21..=400, 20..=400));
        assert!(!region.fits(20..=400, 20..=399));
    }
}
