//! The long-lived rendering context.
//!
//! A [`RenderContext`] owns everything that is expensive to set up and
//! can be shared across renders: the sRGB decoding table, the context
//! options, and running statistics. It converts between the exchange
//! representation (8-bit sRGB) and the engine's native one (linear-light
//! `f32` RGBA), and rasterizes [`Recipe`]s.
//!
//! The context is `!Sync`; renders through one context must be
//! serialized by the caller.

use std::cell::Cell;

use serde::{Deserialize, Serialize};

use crate::engine::Recipe;
use crate::exchange::{ExchangeImage, Orientation};
use crate::types::{ContextOptions, Dimensions, RenderError, Rgba32FImage};

/// Counters accumulated over a context's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContextStats {
    /// Renders attempted through the engine.
    pub renders: u64,
    /// Renders that produced no result.
    pub failures: u64,
}

/// Reusable handle to the image-processing engine.
#[derive(Debug)]
pub struct RenderContext {
    options: ContextOptions,
    to_linear: [f32; 256],
    renders: Cell<u64>,
    failures: Cell<u64>,
}

impl RenderContext {
    /// Build a context. Computes the sRGB decoding table once.
    #[must_use]
    pub fn new(options: ContextOptions) -> Self {
        let to_linear = std::array::from_fn(|i| {
            #[allow(clippy::cast_precision_loss)]
            let encoded = i as f32 / 255.0;
            srgb_to_linear(encoded)
        });
        Self {
            options,
            to_linear,
            renders: Cell::new(0),
            failures: Cell::new(0),
        }
    }

    /// Options this context was created with.
    #[must_use]
    pub const fn options(&self) -> &ContextOptions {
        &self.options
    }

    /// Snapshot of the render counters.
    #[must_use]
    pub fn stats(&self) -> ContextStats {
        ContextStats {
            renders: self.renders.get(),
            failures: self.failures.get(),
        }
    }

    pub(crate) fn record(&self, succeeded: bool) {
        self.renders.set(self.renders.get() + 1);
        if !succeeded {
            self.failures.set(self.failures.get() + 1);
        }
    }

    /// Convert an exchange image to the native linear-light format.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Conversion`] if the exchange buffer is
    /// malformed.
    pub fn to_native(&self, image: &ExchangeImage) -> Result<Rgba32FImage, RenderError> {
        let rgba = image
            .to_rgba_image()
            .map_err(|e| RenderError::Conversion(e.to_string()))?;
        Ok(imageproc::map::map_pixels(&rgba, |p| {
            let [r, g, b, a] = p.0;
            image::Rgba([
                self.to_linear[usize::from(r)],
                self.to_linear[usize::from(g)],
                self.to_linear[usize::from(b)],
                f32::from(a) / 255.0,
            ])
        }))
    }

    /// Convert a native raster back to an 8-bit exchange image carrying
    /// the given display metadata.
    #[must_use]
    pub fn to_exchange(
        &self,
        raster: &Rgba32FImage,
        scale: f64,
        orientation: Orientation,
    ) -> ExchangeImage {
        let rgba = imageproc::map::map_pixels(raster, |p| {
            let [r, g, b, a] = p.0;
            image::Rgba([
                quantize(linear_to_srgb(r)),
                quantize(linear_to_srgb(g)),
                quantize(linear_to_srgb(b)),
                quantize(a),
            ])
        });
        ExchangeImage::from_rgba(rgba)
            .with_scale(scale)
            .with_orientation(orientation)
    }

    /// Reject an extent wider or taller than
    /// [`ContextOptions::max_render_extent`]. Cheap enough to run before
    /// any pixel is converted.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Rasterize`] if either side is over the limit.
    pub fn check_extent(&self, extent: Dimensions) -> Result<(), RenderError> {
        let limit = self.options.max_render_extent;
        if extent.width > limit || extent.height > limit {
            return Err(RenderError::Rasterize(format!(
                "extent {}x{} exceeds the {limit}px limit",
                extent.width, extent.height
            )));
        }
        Ok(())
    }

    /// Rasterize a recipe over its full extent.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Rasterize`] if the extent exceeds
    /// [`ContextOptions::max_render_extent`] or the evaluated pixels are
    /// not finite.
    pub fn rasterize(&self, recipe: &Recipe) -> Result<Rgba32FImage, RenderError> {
        let extent = recipe.extent();
        if extent.is_empty() {
            return Err(RenderError::Rasterize("recipe has an empty extent".into()));
        }
        self.check_extent(extent)?;
        let raster = recipe.evaluate();
        if raster.as_raw().iter().any(|v| !v.is_finite()) {
            return Err(RenderError::Rasterize(
                "operation produced non-finite samples".into(),
            ));
        }
        Ok(raster)
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(ContextOptions::default())
    }
}

/// Decode one sRGB-encoded channel value in `[0, 1]` to linear light.
#[must_use]
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.040_45 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Encode one linear-light channel value to sRGB. Input is clamped to
/// `[0, 1]`.
#[must_use]
pub fn linear_to_srgb(l: f32) -> f32 {
    let l = l.clamp(0.0, 1.0);
    if l <= 0.003_130_8 {
        l * 12.92
    } else {
        1.055_f32.mul_add(l.powf(1.0 / 2.4), -0.055)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn quantize(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::exchange::PixelLayout;
    use crate::types::RgbaImage;

    #[test]
    fn srgb_endpoints_map_to_linear_endpoints() {
        assert!(srgb_to_linear(0.0).abs() < f32::EPSILON);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        assert!(linear_to_srgb(0.0).abs() < f32::EPSILON);
        assert!((linear_to_srgb(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn srgb_mid_grey_is_darker_in_linear() {
        let linear = srgb_to_linear(0.5);
        assert!((linear - 0.214).abs() < 1e-3, "got {linear}");
    }

    #[test]
    fn native_round_trip_is_lossless_for_every_byte() {
        let ctx = RenderContext::default();
        let src = RgbaImage::from_fn(256, 1, |x, _| {
            #[allow(clippy::cast_possible_truncation)]
            let v = x as u8;
            image::Rgba([v, 255 - v, v / 2, v])
        });
        let exchange = ExchangeImage::from_rgba(src.clone());
        let native = ctx.to_native(&exchange).unwrap();
        let back = ctx.to_exchange(&native, 1.0, Orientation::Up);
        assert_eq!(back.to_rgba_image().unwrap(), src);
    }

    #[test]
    fn to_native_rejects_malformed_buffer() {
        let ctx = RenderContext::default();
        let bad = ExchangeImage::new(3, 3, PixelLayout::Rgba8, vec![0; 5]);
        assert!(matches!(
            ctx.to_native(&bad),
            Err(RenderError::Conversion(_))
        ));
    }

    #[test]
    fn to_exchange_attaches_metadata() {
        let ctx = RenderContext::default();
        let raster = Rgba32FImage::from_pixel(2, 2, image::Rgba([0.5, 0.5, 0.5, 1.0]));
        let out = ctx.to_exchange(&raster, 2.0, Orientation::DownMirrored);
        assert!((out.scale() - 2.0).abs() < f64::EPSILON);
        assert_eq!(out.orientation(), Orientation::DownMirrored);
        assert_eq!(out.layout(), PixelLayout::Rgba8);
    }

    #[test]
    fn check_extent_limits_each_side() {
        let ctx = RenderContext::new(ContextOptions {
            max_render_extent: 10,
        });
        let at_limit = Dimensions {
            width: 10,
            height: 10,
        };
        assert!(ctx.check_extent(at_limit).is_ok());
        for extent in [
            Dimensions {
                width: 11,
                height: 1,
            },
            Dimensions {
                width: 1,
                height: 11,
            },
        ] {
            assert!(matches!(
                ctx.check_extent(extent),
                Err(RenderError::Rasterize(_))
            ));
        }
    }

    #[test]
    fn stats_count_renders_and_failures() {
        let ctx = RenderContext::default();
        ctx.record(true);
        ctx.record(false);
        ctx.record(true);
        assert_eq!(
            ctx.stats(),
            ContextStats {
                renders: 3,
                failures: 1
            }
        );
    }
}
