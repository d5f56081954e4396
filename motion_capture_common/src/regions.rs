use image::{GrayImage, Luma};
use imageproc::{definitions::Image, region_labelling::Connectivity};

use crate::Region;

/// Label the 8-connected foreground regions of a binary mask. Background is 0.
pub fn label_regions(mask: &GrayImage) -> Image<Luma<u32>> {
    connected_components(mask, Connectivity::Eight, Luma([0]))
}

/// Set every background pixel that is enclosed by foreground to 255, so that a region's
/// pixel area includes its holes and anything nested inside them.
#[must_use]
pub fn fill_holes(mask: &GrayImage) -> GrayImage {
    let (width, height) = mask.dimensions();

    // the background is 4-connected wherever the foreground is 8-connected
    let outside = connected_components(mask, Connectivity::Four, Luma([255]));

    let mut reaches_border = vec![false; 1];
    for (x, y, &Luma([label])) in outside.enumerate_pixels() {
        let on_border = x == 0 || y == 0 || x + 1 == width || y + 1 == height;
        if label != 0 && on_border {
            let label_idx = label as usize;
            if label_idx >= reaches_border.len() {
                reaches_border.resize(label_idx + 1, false);
            }
            reaches_border[label_idx] = true;
        }
    }

    let mut ret = mask.clone();
    for (&Luma([label]), &mut Luma([ref mut ret_pix])) in outside.pixels().zip(ret.pixels_mut()) {
        let enclosed = label != 0 && !reaches_border.get(label as usize).copied().unwrap_or(false);
        if enclosed {
            *ret_pix = 255;
        }
    }

    ret
}

// imageproc sizes its union-find by pixel count but numbers labels from 1, so a
// single pixel image has to be labelled by hand.
fn connected_components(
    mask: &GrayImage,
    conn: Connectivity,
    background: Luma<u8>,
) -> Image<Luma<u32>> {
    if mask.dimensions() == (1, 1) {
        let label = u32::from(*mask.get_pixel(0, 0) != background);
        return Image::from_pixel(1, 1, Luma([label]));
    }

    imageproc::region_labelling::connected_components(mask, conn, background)
}

/// Pixel count and extent of one labelled region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionStats {
    pub label: u32,
    pub area: u32,
    min: (u32, u32),
    max: (u32, u32),
}

impl RegionStats {
    fn new(label: u32, x: u32, y: u32) -> Self {
        Self {
            label,
            area: 1,
            min: (x, y),
            max: (x, y),
        }
    }

    fn include(&mut self, x: u32, y: u32) {
        self.area += 1;
        self.min = (self.min.0.min(x), self.min.1.min(y));
        self.max = (self.max.0.max(x), self.max.1.max(y));
    }

    pub fn bounding_box(&self) -> Region {
        Region::from_corners(self.min, self.max)
    }
}

/// Collect statistics for every labelled region, in the raster order in which each
/// region is first encountered.
pub fn region_stats(labels: &Image<Luma<u32>>) -> Vec<RegionStats> {
    let mut stats: Vec<RegionStats> = vec![];

    // label -> position in `stats`
    let mut slots: Vec<Option<usize>> = vec![];

    for (x, y, &Luma([label])) in labels.enumerate_pixels() {
        if label == 0 {
            continue;
        }

        let label_idx = label as usize;
        if label_idx >= slots.len() {
            slots.resize(label_idx + 1, None);
        }

        match slots[label_idx] {
            Some(slot) => stats[slot].include(x, y),
            None => {
                slots[label_idx] = Some(stats.len());
                stats.push(RegionStats::new(label, x, y));
            }
        }
    }

    stats
}

/// The region with the greatest pixel area. Ties go to the region encountered first.
///
/// Regions nested inside the holes of another region are counted separately here; run the
/// mask through [`fill_holes`] first to measure outer outlines only.
pub fn largest_region(stats: &[RegionStats]) -> Option<&RegionStats> {
    stats.iter().fold(None, |best, candidate| match best {
        Some(best) if best.area >= candidate.area => Some(best),
        _ => Some(candidate),
    })
}
