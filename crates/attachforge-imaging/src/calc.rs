//! Target dimension computation for style resizes.

use std::fmt;

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn area(&self) -> f64 {
        f64::from(self.width) * f64::from(self.height)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Compute the output size of a resize.
///
/// Without `keep_ratio` the target is used as is. With it, the source is
/// scaled so its area matches the target area (an approximation, not a
/// bounding-box fit). Portrait results then get a second pass that pins the
/// height to the target height and scales the width by the first pass's side
/// ratio. Sources smaller than the target on both axes are never upscaled.
///
/// All fractional results round up.
///
/// # Example
///
/// ```
/// use attachforge_imaging::{compute, Dimensions};
///
/// let out = compute(Dimensions::new(300, 600), Dimensions::new(100, 60), true);
/// assert_eq!(out, Dimensions::new(30, 60));
///
/// let out = compute(Dimensions::new(400, 300), Dimensions::new(200, 200), false);
/// assert_eq!(out, Dimensions::new(200, 200));
/// ```
pub fn compute(original: Dimensions, target: Dimensions, keep_ratio: bool) -> Dimensions {
    if !keep_ratio {
        return target;
    }
    if original.width == 0 || original.height == 0 {
        return original;
    }

    let ratio = (target.area() / original.area()).sqrt();
    let mut height = (f64::from(original.height) * ratio).ceil() as u64;
    let mut width = (f64::from(original.width) * ratio).ceil() as u64;

    if width < height {
        // portrait
        let target_height = u64::from(target.height);
        width = (target_height * width).div_ceil(height);
        height = target_height;
    }

    if original.width < target.width && original.height < target.height {
        return original;
    }

    Dimensions::new(saturate(width), saturate(height))
}

fn saturate(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
