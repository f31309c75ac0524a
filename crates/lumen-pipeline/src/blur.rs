//! Gaussian blur and the bloom glow built on it.
//!
//! [`gaussian_blur`] wraps [`image::imageops::blur`] for the engine's
//! float RGBA format. [`bloom`] blurs a copy of the image and screens it
//! back over the source, so bright regions spill a soft glow into their
//! surroundings.

use image::Rgba;
use imageproc::map::map_pixels2;

use crate::types::Rgba32FImage;

/// Apply Gaussian blur to every channel of a float RGBA image.
///
/// Non-positive or non-finite sigma values return the image unchanged.
#[must_use = "returns the blurred image"]
pub fn gaussian_blur(image: &Rgba32FImage, sigma: f32) -> Rgba32FImage {
    if !(sigma.is_finite() && sigma > 0.0) {
        return image.clone();
    }

    image::imageops::blur(image, sigma)
}

/// Soft glow: screen a blurred copy of `image` over itself.
///
/// `radius` is the glow radius in pixels; the Gaussian sigma is half of
/// it, so a radius of zero applies no blur. `intensity` weights the glow
/// layer (0 leaves the image unchanged). Alpha is taken from the source.
#[must_use = "returns the bloomed image"]
pub fn bloom(image: &Rgba32FImage, intensity: f32, radius: f32) -> Rgba32FImage {
    let weight = intensity.clamp(0.0, 1.0);
    let glow = gaussian_blur(image, radius / 2.0);

    map_pixels2(image, &glow, |Rgba([r, g, b, a]), Rgba([gr, gg, gb, _])| {
        let screen = |base: f32, light: f32| {
            let light = (light * weight).clamp(0.0, 1.0);
            (1.0 - (1.0 - base) * (1.0 - light)).clamp(0.0, 1.0)
        };
        Rgba([screen(r, gr), screen(g, gg), screen(b, gb), a])
    })
}
