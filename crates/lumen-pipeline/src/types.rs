//! Shared types for the lumen filter pipeline.

use serde::{Deserialize, Serialize};

use crate::catalog::FilterVariant;

/// Re-export `RgbaImage` so downstream crates can build exchange images
/// without depending on `image` directly.
pub use image::RgbaImage;

/// Re-export the engine-native float image type.
pub use image::Rgba32FImage;

/// Normalized filter intensity in the closed range `[0.0, 1.0]`.
///
/// Construction never fails: values below zero become `0.0`, values
/// above one become `1.0`, and `NaN` becomes `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Intensity(f64);

impl Intensity {
    /// Lowest intensity (filter at its weakest setting).
    pub const MIN: Self = Self(0.0);

    /// Highest intensity (filter at its strongest setting).
    pub const MAX: Self = Self(1.0);

    /// Clamp an arbitrary slider value into `[0.0, 1.0]`.
    #[must_use]
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::MIN;
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// The clamped value.
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl From<f64> for Intensity {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Intensity> for f64 {
    fn from(intensity: Intensity) -> Self {
        intensity.0
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Total pixel count.
    #[must_use]
    pub const fn pixel_count(self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Returns `true` if either axis is zero.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Options fixed when a [`RenderContext`](crate::RenderContext) is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextOptions {
    /// Largest width or height, in pixels, the context will rasterize.
    /// Larger recipes fail with [`RenderError::Rasterize`].
    pub max_render_extent: u32,
}

impl ContextOptions {
    /// Default value for [`max_render_extent`](Self::max_render_extent).
    pub const DEFAULT_MAX_RENDER_EXTENT: u32 = 16_384;
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            max_render_extent: Self::DEFAULT_MAX_RENDER_EXTENT,
        }
    }
}

/// Reasons a single render can fail.
///
/// These never reach callers of [`FilterPipeline::apply`](crate::FilterPipeline::apply),
/// which collapses every variant into "return the input image unchanged".
/// [`FilterPipeline::try_apply`](crate::FilterPipeline::try_apply) exposes
/// them for diagnostics and tests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The exchange image could not be converted to the engine format.
    #[error("cannot convert source image: {0}")]
    Conversion(String),

    /// No operation is registered under the requested name.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    /// A parameter set was bound to an operation it does not describe.
    #[error("operation {operation} cannot take {parameters} parameters")]
    ParameterMismatch {
        /// Name of the resolved operation.
        operation: &'static str,
        /// Variant the supplied parameters belong to.
        parameters: FilterVariant,
    },

    /// The recipe could not be rasterized into pixels.
    #[error("rasterization failed: {0}")]
    Rasterize(String),
}

/// Outcome of one render: the filtered image, or why there is none.
pub type RenderResult = Result<crate::ExchangeImage, RenderError>;

/// Errors from decoding or encoding exchange images.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    /// The encoded input bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Failed to decode the input bytes.
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// Failed to encode the image.
    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    /// The pixel buffer does not describe a valid image.
    #[error("malformed pixel buffer: {0}")]
    Malformed(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // --- Intensity tests ---

    #[test]
    fn intensity_in_range_is_kept() {
        assert!((Intensity::new(0.42).get() - 0.42).abs() < f64::EPSILON);
    }

    #[test]
    fn intensity_below_zero_clamps_to_zero() {
        assert_eq!(Intensity::new(-5.0), Intensity::MIN);
        assert_eq!(Intensity::new(f64::NEG_INFINITY), Intensity::MIN);
    }

    #[test]
    fn intensity_above_one_clamps_to_one() {
        assert_eq!(Intensity::new(5.0), Intensity::MAX);
        assert_eq!(Intensity::new(f64::INFINITY), Intensity::MAX);
    }

    #[test]
    fn intensity_nan_becomes_zero() {
        assert_eq!(Intensity::new(f64::NAN), Intensity::MIN);
    }

    #[test]
    fn intensity_deserialize_clamps() {
        let intensity: Intensity = serde_json::from_str("3.5").unwrap();
        assert_eq!(intensity, Intensity::MAX);
        assert_eq!(serde_json::to_string(&Intensity::new(0.25)).unwrap(), "0.25");
    }

    // --- Dimensions tests ---

    #[test]
    fn dimensions_pixel_count_does_not_overflow() {
        let d = Dimensions {
            width: u32::MAX,
            height: 2,
        };
        assert_eq!(d.pixel_count(), u64::from(u32::MAX) * 2);
    }

    #[test]
    fn dimensions_empty_when_any_axis_is_zero() {
        assert!(
            Dimensions {
                width: 0,
                height: 10
            }
            .is_empty()
        );
        assert!(
            !Dimensions {
                width: 1,
                height: 1
            }
            .is_empty()
        );
    }

    // --- ContextOptions tests ---

    #[test]
    fn context_options_default_extent() {
        assert_eq!(ContextOptions::default().max_render_extent, 16_384);
    }

    #[test]
    fn context_options_missing_fields_use_defaults() {
        let options: ContextOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, ContextOptions::default());
    }

    // --- Error display tests ---

    #[test]
    fn error_parameter_mismatch_display() {
        let err = RenderError::ParameterMismatch {
            operation: "vignette",
            parameters: FilterVariant::Sepia,
        };
        assert_eq!(
            err.to_string(),
            "operation vignette cannot take Sepia parameters"
        );
    }

    #[test]
    fn error_empty_input_display() {
        assert_eq!(
            ExchangeError::EmptyInput.to_string(),
            "input image data is empty"
        );
    }
}
