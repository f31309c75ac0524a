//! Pipeline facade: catalog -> parameter mapper -> render engine.
//!
//! [`FilterPipeline`] owns the one [`RenderContext`] and exposes a total
//! `apply` that never fails:
//!
//! ```rust
//! # use lumen_pipeline::{ExchangeImage, FilterPipeline, FilterVariant};
//! # use lumen_pipeline::types::RgbaImage;
//! let pipeline = FilterPipeline::new();
//! let photo = ExchangeImage::from_rgba(RgbaImage::from_pixel(8, 8, image::Rgba([200, 150, 90, 255])))
//!     .with_scale(2.0);
//!
//! let edited = pipeline.apply(FilterVariant::Vignette, 0.7, &photo);
//! assert_eq!(edited.dimensions(), photo.dimensions());
//! assert!((edited.scale() - 2.0).abs() < f64::EPSILON);
//! ```
//!
//! Internally every failure is a [`RenderError`]; [`FilterPipeline::apply`]
//! logs it and hands back the input image, while
//! [`FilterPipeline::try_apply`] surfaces it.

use std::borrow::Cow;

use tracing::warn;

use crate::catalog::FilterVariant;
use crate::context::RenderContext;
use crate::engine::RenderEngine;
use crate::exchange::ExchangeImage;
use crate::params::map_parameters;
use crate::types::{ContextOptions, Intensity, RenderError};

/// Applies filters to exchange images through a single reusable context.
///
/// Not `Sync`: serialize calls when sharing one pipeline.
#[derive(Debug, Default)]
pub struct FilterPipeline {
    context: RenderContext,
}

impl FilterPipeline {
    /// Create a pipeline with default [`ContextOptions`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pipeline whose context uses `options`.
    #[must_use]
    pub fn with_options(options: ContextOptions) -> Self {
        Self {
            context: RenderContext::new(options),
        }
    }

    /// The shared rendering context.
    #[must_use]
    pub const fn context(&self) -> &RenderContext {
        &self.context
    }

    /// Apply `filter` at `intensity` to `image`.
    ///
    /// `intensity` is clamped to `[0, 1]` (`NaN` counts as 0).
    /// [`FilterVariant::Original`] returns `image` itself without touching
    /// the engine. Any render failure also returns `image` itself, so the
    /// result is either a new image with the same scale and orientation
    /// or the borrowed input.
    #[must_use = "returns the filtered image"]
    pub fn apply<'a>(
        &self,
        filter: FilterVariant,
        intensity: f64,
        image: &'a ExchangeImage,
    ) -> Cow<'a, ExchangeImage> {
        self.try_apply(filter, intensity, image)
            .unwrap_or_else(|err| {
                warn!(
                    %filter,
                    error = %err,
                    width = image.width(),
                    height = image.height(),
                    "filter render failed, keeping original image",
                );
                Cow::Borrowed(image)
            })
    }

    /// Like [`apply`](Self::apply), but reports why a render produced no
    /// result instead of falling back.
    ///
    /// # Errors
    ///
    /// Returns the [`RenderError`] from the engine.
    pub fn try_apply<'a>(
        &self,
        filter: FilterVariant,
        intensity: f64,
        image: &'a ExchangeImage,
    ) -> Result<Cow<'a, ExchangeImage>, RenderError> {
        let intensity = Intensity::new(intensity);
        if filter == FilterVariant::Original {
            return Ok(Cow::Borrowed(image));
        }

        let parameters = map_parameters(filter, intensity);
        RenderEngine::new(&self.context)
            .render(filter, &parameters, image)
            .map(Cow::Owned)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::exchange::{Orientation, PixelLayout};
    use crate::types::RgbaImage;

    #[allow(clippy::cast_possible_truncation)]
    fn photo() -> ExchangeImage {
        ExchangeImage::from_rgba(RgbaImage::from_fn(16, 12, |x, y| {
            image::Rgba([(x * 15) as u8, (y * 20) as u8, ((x + y) * 8) as u8, 255])
        }))
        .with_scale(2.0)
        .with_orientation(Orientation::Left)
    }

    #[test]
    fn original_returns_the_same_image() {
        let pipeline = FilterPipeline::new();
        let img = photo();
        for t in [-1.0, 0.0, 0.5, 1.0, 7.0, f64::NAN] {
            let out = pipeline.apply(FilterVariant::Original, t, &img);
            assert!(matches!(out, Cow::Borrowed(b) if std::ptr::eq(b, &img)));
        }
        assert_eq!(pipeline.context().stats().renders, 0);
    }

    #[test]
    fn filters_produce_new_images() {
        let pipeline = FilterPipeline::new();
        let img = photo();
        for filter in FilterVariant::all().filter(|f| *f != FilterVariant::Original) {
            let out = pipeline.apply(filter, 1.0, &img);
            assert!(matches!(out, Cow::Owned(_)), "{filter} fell back");
        }
    }

    #[test]
    fn out_of_range_intensity_matches_clamped() {
        let pipeline = FilterPipeline::new();
        let img = photo();
        for filter in FilterVariant::all() {
            assert_eq!(
                pipeline.apply(filter, -5.0, &img),
                pipeline.apply(filter, 0.0, &img),
                "{filter} at -5"
            );
            assert_eq!(
                pipeline.apply(filter, 5.0, &img),
                pipeline.apply(filter, 1.0, &img),
                "{filter} at 5"
            );
            assert_eq!(
                pipeline.apply(filter, f64::NAN, &img),
                pipeline.apply(filter, 0.0, &img),
                "{filter} at NaN"
            );
        }
    }

    #[test]
    fn malformed_image_falls_back_to_input() {
        let pipeline = FilterPipeline::new();
        let bad = ExchangeImage::new(10, 10, PixelLayout::Rgba8, vec![1, 2, 3]);
        for filter in FilterVariant::all() {
            let out = pipeline.apply(filter, 0.5, &bad);
            assert!(matches!(out, Cow::Borrowed(b) if std::ptr::eq(b, &bad)));
        }
    }

    #[test]
    fn try_apply_reports_conversion_failure() {
        let pipeline = FilterPipeline::new();
        let empty = ExchangeImage::new(0, 0, PixelLayout::Rgba8, Vec::new());
        assert!(matches!(
            pipeline.try_apply(FilterVariant::Sepia, 0.5, &empty),
            Err(RenderError::Conversion(_))
        ));
        assert_eq!(pipeline.context().stats().failures, 1);
    }

    #[test]
    fn extent_limit_failure_falls_back() {
        let pipeline = FilterPipeline::with_options(ContextOptions {
            max_render_extent: 8,
        });
        let img = photo();
        assert!(matches!(
            pipeline.try_apply(FilterVariant::Bloom, 0.5, &img),
            Err(RenderError::Rasterize(_))
        ));
        let out = pipeline.apply(FilterVariant::Bloom, 0.5, &img);
        assert!(matches!(out, Cow::Borrowed(b) if std::ptr::eq(b, &img)));
    }

    #[test]
    fn context_is_reused_across_calls() {
        let pipeline = FilterPipeline::new();
        let img = photo();
        let ctx: *const RenderContext = pipeline.context();
        let _ = pipeline.apply(FilterVariant::Noir, 0.0, &img);
        let _ = pipeline.apply(FilterVariant::Sepia, 0.3, &img);
        assert!(std::ptr::eq(ctx, pipeline.context()));
        assert_eq!(pipeline.context().stats().renders, 2);
    }
}
