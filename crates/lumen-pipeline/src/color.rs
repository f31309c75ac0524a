//! Per-pixel color operations: noir, sepia toning and color controls.
//!
//! All operations take and return linear-light [`Rgba32FImage`]s, act on
//! the RGB channels only, and pass alpha through. Results are clamped to
//! `[0, 1]`.

use image::Rgba;
use imageproc::map::map_pixels;

use crate::types::Rgba32FImage;

/// Rec. 709 luminance weights.
const LUMA: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// Pivot for contrast scaling.
const MID_GREY: f32 = 0.5;

/// Contrast boost applied by [`noir`].
pub const NOIR_CONTRAST: f32 = 1.35;

/// Sepia toning matrix (rows produce R, G, B).
const SEPIA: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

fn luminance(r: f32, g: f32, b: f32) -> f32 {
    LUMA[0].mul_add(r, LUMA[1].mul_add(g, LUMA[2] * b))
}

fn stretch(v: f32, contrast: f32) -> f32 {
    (v - MID_GREY).mul_add(contrast, MID_GREY)
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    (to - from).mul_add(t, from)
}

/// High-contrast monochrome.
#[must_use = "returns the noir image"]
pub fn noir(image: &Rgba32FImage) -> Rgba32FImage {
    map_pixels(image, |Rgba([r, g, b, a])| {
        let y = stretch(luminance(r, g, b), NOIR_CONTRAST).clamp(0.0, 1.0);
        Rgba([y, y, y, a])
    })
}

/// Sepia toning blended with the source by `intensity` (0 leaves the
/// image unchanged, 1 is full sepia).
#[must_use = "returns the toned image"]
pub fn sepia_tone(image: &Rgba32FImage, intensity: f32) -> Rgba32FImage {
    let t = intensity.clamp(0.0, 1.0);
    map_pixels(image, |Rgba([r, g, b, a])| {
        let [tr, tg, tb] = SEPIA.map(|[kr, kg, kb]| kr.mul_add(r, kg.mul_add(g, kb * b)).min(1.0));
        Rgba([
            lerp(r, tr, t).clamp(0.0, 1.0),
            lerp(g, tg, t).clamp(0.0, 1.0),
            lerp(b, tb, t).clamp(0.0, 1.0),
            a,
        ])
    })
}

/// Saturation, then brightness, then contrast.
///
/// `saturation` and `contrast` are multipliers (1 is neutral);
/// `brightness` is an additive offset (0 is neutral).
#[must_use = "returns the adjusted image"]
pub fn color_controls(
    image: &Rgba32FImage,
    saturation: f32,
    contrast: f32,
    brightness: f32,
) -> Rgba32FImage {
    map_pixels(image, |Rgba([r, g, b, a])| {
        let y = luminance(r, g, b);
        let adjust = |c: f32| stretch(lerp(y, c, saturation) + brightness, contrast).clamp(0.0, 1.0);
        Rgba([adjust(r), adjust(g), adjust(b), a])
    })
}
