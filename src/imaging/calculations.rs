//! Pure calculation functions for image dimensions.

use super::backend::Dimensions;

/// Target size for a scale tier.
///
/// Width is `floor(native_width * dpr)`; height keeps the native aspect
/// ratio, rounded, never below 1. Returns `None` when the width collapses
/// to zero (tiny source or tiny dpr).
///
/// ```
/// # use trq_image::imaging::{scaled_dimensions, Dimensions};
/// let native = Dimensions { width: 1000, height: 750 };
/// assert_eq!(scaled_dimensions(native, 0.5), Some((500, 375)));
/// assert_eq!(scaled_dimensions(native, 0.0001), None);
/// ```
pub fn scaled_dimensions(native: Dimensions, dpr: f64) -> Option<(u32, u32)> {
    if native.width == 0 || native.height == 0 {
        return None;
    }
    let width = (native.width as f64 * dpr).floor();
    if !(width >= 1.0) || width > u32::MAX as f64 {
        return None;
    }
    let width = width as u32;
    let height = (native.height as f64 * width as f64 / native.width as f64)
        .round()
        .max(1.0) as u32;
    Some((width, height))
}
