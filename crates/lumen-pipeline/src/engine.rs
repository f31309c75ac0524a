//! Render engine: resolve a named operation, bind parameters, build a lazy
//! recipe and rasterize it through the shared [`RenderContext`].
//!
//! ```rust
//! # use lumen_pipeline::{ExchangeImage, FilterVariant, Intensity, RenderContext, RenderEngine, map_parameters};
//! # use lumen_pipeline::types::RgbaImage;
//! let context = RenderContext::default();
//! let source = ExchangeImage::from_rgba(RgbaImage::from_pixel(4, 4, image::Rgba([90, 120, 200, 255])));
//! let parameters = map_parameters(FilterVariant::Sepia, Intensity::new(0.8));
//!
//! let sepia = RenderEngine::new(&context).render(FilterVariant::Sepia, &parameters, &source);
//! assert!(sepia.is_ok());
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use tracing::debug;

use crate::catalog::FilterVariant;
use crate::context::RenderContext;
use crate::exchange::ExchangeImage;
use crate::params::ParameterSet;
use crate::types::{Dimensions, RenderError, RenderResult, Rgba32FImage};

/// A render operation the engine knows by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// High-contrast monochrome.
    PhotoEffectNoir,
    /// Sepia toning.
    SepiaTone,
    /// Glow.
    Bloom,
    /// Edge darkening.
    Vignette,
    /// Saturation, brightness, contrast.
    ColorControls,
}

impl Operation {
    /// Every registered operation.
    pub const ALL: [Self; 5] = [
        Self::PhotoEffectNoir,
        Self::SepiaTone,
        Self::Bloom,
        Self::Vignette,
        Self::ColorControls,
    ];

    /// Registered name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::PhotoEffectNoir => "photo-effect-noir",
            Self::SepiaTone => "sepia-tone",
            Self::Bloom => "bloom",
            Self::Vignette => "vignette",
            Self::ColorControls => "color-controls",
        }
    }

    /// The operation that renders `variant`, or `None` for
    /// [`FilterVariant::Original`], which has no operation.
    #[must_use]
    pub const fn for_variant(variant: FilterVariant) -> Option<Self> {
        match variant {
            FilterVariant::Original => None,
            FilterVariant::Noir => Some(Self::PhotoEffectNoir),
            FilterVariant::Sepia => Some(Self::SepiaTone),
            FilterVariant::Bloom => Some(Self::Bloom),
            FilterVariant::Vignette => Some(Self::Vignette),
            FilterVariant::ColorAdjust => Some(Self::ColorControls),
        }
    }

    /// Attach concrete parameters.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::ParameterMismatch`] if `parameters` belong
    /// to a different filter.
    pub fn bind(self, parameters: ParameterSet) -> Result<BoundOperation, RenderError> {
        let accepts = Self::for_variant(parameters.variant()) == Some(self);
        if !accepts {
            return Err(RenderError::ParameterMismatch {
                operation: self.name(),
                parameters: parameters.variant(),
            });
        }
        Ok(BoundOperation {
            operation: self,
            parameters,
        })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| RenderError::UnknownOperation(s.to_owned()))
    }
}

/// An operation with parameters that are known to match it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundOperation {
    operation: Operation,
    parameters: ParameterSet,
}

impl BoundOperation {
    /// The operation.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    /// The bound parameters.
    #[must_use]
    pub const fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    fn apply(&self, source: &Rgba32FImage) -> Rgba32FImage {
        match self.parameters {
            ParameterSet::Original => source.clone(),
            ParameterSet::Noir => crate::color::noir(source),
            ParameterSet::Sepia { intensity } => crate::color::sepia_tone(source, intensity),
            ParameterSet::Bloom { intensity, radius } => {
                crate::blur::bloom(source, intensity, radius)
            }
            ParameterSet::Vignette { intensity, radius } => {
                crate::vignette::vignette(source, intensity, radius)
            }
            ParameterSet::ColorAdjust {
                saturation,
                contrast,
                brightness,
            } => crate::color::color_controls(source, saturation, contrast, brightness),
        }
    }
}

/// A lazy description of an output image: a source plus an optional
/// operation. No pixels are computed until the recipe is rasterized by
/// [`RenderContext::rasterize`].
#[derive(Debug, Clone)]
pub struct Recipe {
    source: Rgba32FImage,
    operation: Option<BoundOperation>,
}

impl Recipe {
    /// Build a recipe. `None` describes the source itself.
    #[must_use]
    pub const fn new(source: Rgba32FImage, operation: Option<BoundOperation>) -> Self {
        Self { source, operation }
    }

    /// The region the recipe covers, which is the source extent.
    #[must_use]
    pub fn extent(&self) -> Dimensions {
        let (width, height) = self.source.dimensions();
        Dimensions { width, height }
    }

    /// The bound operation, if any.
    #[must_use]
    pub const fn operation(&self) -> Option<&BoundOperation> {
        self.operation.as_ref()
    }

    pub(crate) fn evaluate(&self) -> Rgba32FImage {
        self.operation
            .as_ref()
            .map_or_else(|| self.source.clone(), |op| op.apply(&self.source))
    }
}

/// Applies filters using a borrowed, long-lived [`RenderContext`].
#[derive(Debug, Clone, Copy)]
pub struct RenderEngine<'ctx> {
    context: &'ctx RenderContext,
}

impl<'ctx> RenderEngine<'ctx> {
    /// Borrow `context` for rendering.
    #[must_use]
    pub const fn new(context: &'ctx RenderContext) -> Self {
        Self { context }
    }

    /// Render `variant` with `parameters` applied to `image`.
    ///
    /// On success the output carries the input's scale and orientation.
    ///
    /// # Errors
    ///
    /// - [`RenderError::Conversion`] if `image` is malformed or empty.
    /// - [`RenderError::ParameterMismatch`] if `parameters` do not belong
    ///   to `variant`.
    /// - [`RenderError::Rasterize`] if the context cannot rasterize the
    ///   result.
    pub fn render(
        &self,
        variant: FilterVariant,
        parameters: &ParameterSet,
        image: &ExchangeImage,
    ) -> RenderResult {
        let result = self.render_inner(variant, parameters, image);
        self.context.record(result.is_ok());
        result
    }

    fn render_inner(
        &self,
        variant: FilterVariant,
        parameters: &ParameterSet,
        image: &ExchangeImage,
    ) -> RenderResult {
        let start = Instant::now();

        // The extent limit bounds the native allocation, so it goes first.
        self.context.check_extent(image.dimensions())?;

        // 1. Exchange -> native.
        let source = self.context.to_native(image)?;

        // 2. Resolve and bind.
        let operation = match Operation::for_variant(variant) {
            Some(op) => Some(op.bind(*parameters)?),
            None if *parameters == ParameterSet::Original => None,
            None => {
                return Err(RenderError::ParameterMismatch {
                    operation: "passthrough",
                    parameters: parameters.variant(),
                });
            }
        };

        // 3. Lazy recipe.
        let recipe = Recipe::new(source, operation);

        // 4. Rasterize over the recipe's extent.
        let raster = self.context.rasterize(&recipe)?;

        // 5. Native -> exchange, re-attaching the source metadata.
        let output = self
            .context
            .to_exchange(&raster, image.scale(), image.orientation());

        debug!(
            filter = %variant,
            operation = operation.map_or("passthrough", |op| op.operation().name()),
            width = output.width(),
            height = output.height(),
            elapsed_us = start.elapsed().as_micros(),
            "rendered filter",
        );
        Ok(output)
    }
}
