//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::{Dimensions, ResizePlan};

/// Compute `round(a * b / c)` with halves rounded away from zero.
///
/// Done in integer arithmetic so `.5` cases are exact.
fn scale_round(a: u32, b: u32, c: u32) -> u32 {
    let (a, b, c) = (u128::from(a), u128::from(b), u128::from(c));
    ((2 * a * b + c) / (2 * c)) as u32
}

/// Plan the target size of a shrink so the image fits inside
/// `max_width` x `max_height` while keeping its proportions.
///
/// The width constraint is applied first. The height constraint is then
/// checked against the *already width-adjusted* size, so a second
/// proportional pass corrects any remaining overflow. Images are never
/// enlarged: when no constraint triggers, the original size is returned.
///
/// A dimension that rounds down to zero (extreme aspect ratios) is kept
/// at one pixel, and a maximum of zero is treated as one, so the plan is
/// always at least 1x1.
///
/// # Examples
/// ```
/// # use imgfit::imaging::{Dimensions, plan_resize};
/// let tall = Dimensions { width: 500, height: 1000 };
/// let plan = plan_resize(tall, Some(300), Some(100));
/// assert_eq!((plan.width, plan.height), (50, 100));
/// ```
pub fn plan_resize(
    original: Dimensions,
    max_width: Option<u32>,
    max_height: Option<u32>,
) -> ResizePlan {
    let mut width = original.width;
    let mut height = original.height;

    let max_width = max_width.map(|max| max.max(1));
    let max_height = max_height.map(|max| max.max(1));

    if let Some(max_width) = max_width
        && width > max_width
    {
        height = scale_round(max_width, height, width).max(1);
        width = max_width;
    }

    if let Some(max_height) = max_height
        && height > max_height
    {
        width = scale_round(max_height, width, height).max(1);
        height = max_height;
    }

    ResizePlan { width, height }
}
