//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Constrain dimensions to a maximum width, preserving aspect ratio.
///
/// Never upscales. A `max_width` of 0 means "no limit".
///
/// # Examples
/// ```
/// # use picturephone_archive::imaging::constrain_to_width;
/// assert_eq!(constrain_to_width((1600, 1200), 800), (800, 600));
/// assert_eq!(constrain_to_width((400, 300), 800), (400, 300));
/// assert_eq!(constrain_to_width((1600, 1200), 0), (1600, 1200));
/// ```
pub fn constrain_to_width(original: (u32, u32), max_width: u32) -> (u32, u32) {
    let (w, h) = original;
    if max_width == 0 || w <= max_width {
        return original;
    }
    let height = (h as f64 * max_width as f64 / w as f64).round() as u32;
    (max_width, height.max(1))
}
