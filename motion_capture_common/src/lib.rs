#![allow(clippy::let_and_return)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
#![deny(clippy::dbg_macro)]

// #![warn(clippy::cast_possible_truncation)]
// #![warn(clippy::cast_sign_loss)]

pub mod block_align;
pub mod change_mask;
mod region;
pub mod regions;
pub mod smoothing;


pub use block_align::{align_down, safe_resolution, AlignError};
pub use change_mask::{abs_diff, change_mask};
pub use region::Region;
pub use regions::{fill_holes, label_regions, largest_region, region_stats, RegionStats};
pub use smoothing::{smoothed_luma, DEFAULT_BLUR_SIGMA};
