//! Radial edge darkening.
//!
//! Each pixel's distance from the image centre is normalised to the
//! half-diagonal, so `d = 0` at the centre and `d = 1` in the corners.
//! The darkening falloff is `clamp(d * radius / 4, 0, 1)^2` and the pixel
//! is multiplied by `1 - intensity * falloff`, clamped to `[0, 1]`.
//! Larger radii pull the dark edge further in; intensities above 1
//! saturate the corners to black.

use image::Rgba;
use imageproc::map::map_enumerated_pixels;

use crate::types::Rgba32FImage;

/// Radius at which the falloff reaches 1 exactly in the corners.
const FULL_REACH_RADIUS: f32 = 4.0;

/// Darken the edges of `image`.
#[must_use = "returns the vignetted image"]
pub fn vignette(image: &Rgba32FImage, intensity: f32, radius: f32) -> Rgba32FImage {
    let (w, h) = image.dimensions();
    #[allow(clippy::cast_precision_loss)]
    let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
    let half_diagonal = cx.hypot(cy).max(f32::EPSILON);
    let reach = radius.max(0.0) / FULL_REACH_RADIUS;

    map_enumerated_pixels(image, |x, y, Rgba([r, g, b, a])| {
        #[allow(clippy::cast_precision_loss)]
        let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
        let d = (px - cx).hypot(py - cy) / half_diagonal;
        let falloff = (d * reach).clamp(0.0, 1.0).powi(2);
        let m = intensity.mul_add(-falloff, 1.0).clamp(0.0, 1.0);
        Rgba([r * m, g * m, b * m, a])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white(w: u32, h: u32) -> Rgba32FImage {
        Rgba32FImage::from_pixel(w, h, Rgba([1.0, 1.0, 1.0, 1.0]))
    }

    #[test]
    fn zero_intensity_is_identity() {
        let img = white(9, 9);
        assert_eq!(vignette(&img, 0.0, 4.0), img);
    }

    #[test]
    fn corners_darker_than_centre() {
        let out = vignette(&white(21, 21), 1.0, 2.0);
        let centre = out.get_pixel(10, 10).0[0];
        let corner = out.get_pixel(0, 0).0[0];
        assert!(corner < centre, "corner {corner} should be darker than centre {centre}");
        assert!(centre > 0.99, "centre should stay bright, got {centre}");
    }

    #[test]
    fn larger_radius_darkens_more() {
        let near = vignette(&white(21, 21), 1.0, 1.0).get_pixel(3, 3).0[0];
        let far = vignette(&white(21, 21), 1.0, 4.0).get_pixel(3, 3).0[0];
        assert!(far < near, "radius 4 ({far}) should be darker than radius 1 ({near})");
    }

    #[test]
    fn strong_vignette_blackens_corners_without_going_negative() {
        let out = vignette(&white(21, 21), 2.0, 4.0);
        let corner = out.get_pixel(0, 0).0;
        assert!(corner[0] >= 0.0 && corner[0] < 0.1, "got {}", corner[0]);
        assert!((corner[3] - 1.0).abs() < f32::EPSILON, "alpha must be untouched");
    }

    #[test]
    fn single_pixel_image_is_safe() {
        let out = vignette(&white(1, 1), 2.0, 4.0);
        assert!(out.get_pixel(0, 0).0[0].is_finite());
    }
}
