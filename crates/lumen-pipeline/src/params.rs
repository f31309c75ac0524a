//! Parameter mapping: one intensity slider to each filter's native knobs.
//!
//! Every filter's native parameter range is rescaled from the single
//! `[0, 1]` slider into a perceptually useful span rather than the
//! engine's raw default range. The constants below define how the slider
//! feels and must not drift.

use serde::{Deserialize, Serialize};

use crate::catalog::FilterVariant;
use crate::types::Intensity;

/// Bloom radius at full intensity.
pub const BLOOM_MAX_RADIUS: f64 = 20.0;

/// Vignette darkening at full intensity, twice the engine default.
pub const VIGNETTE_MAX_INTENSITY: f64 = 2.0;

/// Vignette radius at full intensity.
pub const VIGNETTE_MAX_RADIUS: f64 = 4.0;

/// Smallest vignette radius. A radius of zero renders no vignette at all.
pub const VIGNETTE_MIN_RADIUS: f64 = 1.0;

/// Saturation at zero intensity (under-saturated).
pub const SATURATION_BASE: f64 = 0.5;
/// Saturation gained across the slider (up to 1.5).
pub const SATURATION_SPAN: f64 = 1.0;

/// Contrast at zero intensity.
pub const CONTRAST_BASE: f64 = 0.9;
/// Contrast gained across the slider (up to 1.3).
pub const CONTRAST_SPAN: f64 = 0.4;

/// Brightness offset at zero intensity.
pub const BRIGHTNESS_BASE: f64 = -0.1;
/// Brightness gained across the slider (up to +0.1).
pub const BRIGHTNESS_SPAN: f64 = 0.2;

/// Concrete parameters for one filter's render operation.
///
/// Values are `f32` because that is the precision the engine works in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParameterSet {
    /// No parameters; the input passes through.
    Original,
    /// Fixed look; no parameters.
    Noir,
    /// Sepia toning.
    Sepia {
        /// Blend between source (0) and full sepia (1).
        intensity: f32,
    },
    /// Glow.
    Bloom {
        /// Glow strength, 0 to 1.
        intensity: f32,
        /// Glow radius in pixels.
        radius: f32,
    },
    /// Edge darkening.
    Vignette {
        /// Darkening strength.
        intensity: f32,
        /// Reach of the darkening; at 4 the corners take the full strength.
        radius: f32,
    },
    /// Color controls.
    ColorAdjust {
        /// Saturation multiplier (1 is unchanged).
        saturation: f32,
        /// Contrast multiplier around mid-grey (1 is unchanged).
        contrast: f32,
        /// Additive brightness offset (0 is unchanged).
        brightness: f32,
    },
}

impl ParameterSet {
    /// The filter variant these parameters belong to.
    #[must_use]
    pub const fn variant(&self) -> FilterVariant {
        match self {
            Self::Original => FilterVariant::Original,
            Self::Noir => FilterVariant::Noir,
            Self::Sepia { .. } => FilterVariant::Sepia,
            Self::Bloom { .. } => FilterVariant::Bloom,
            Self::Vignette { .. } => FilterVariant::Vignette,
            Self::ColorAdjust { .. } => FilterVariant::ColorAdjust,
        }
    }
}

/// Derive the concrete parameters for `variant` at `intensity`.
///
/// Total over every variant. [`FilterVariant::Original`] maps to
/// [`ParameterSet::Original`] even though the pipeline short-circuits
/// before asking.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn map_parameters(variant: FilterVariant, intensity: Intensity) -> ParameterSet {
    let t = intensity.get();
    match variant {
        FilterVariant::Original => ParameterSet::Original,
        FilterVariant::Noir => ParameterSet::Noir,
        FilterVariant::Sepia => ParameterSet::Sepia { intensity: t as f32 },
        FilterVariant::Bloom => ParameterSet::Bloom {
            intensity: t as f32,
            radius: (t * BLOOM_MAX_RADIUS) as f32,
        },
        FilterVariant::Vignette => ParameterSet::Vignette {
            intensity: (t * VIGNETTE_MAX_INTENSITY) as f32,
            radius: VIGNETTE_MIN_RADIUS.max(t * VIGNETTE_MAX_RADIUS) as f32,
        },
        FilterVariant::ColorAdjust => ParameterSet::ColorAdjust {
            saturation: SATURATION_SPAN.mul_add(t, SATURATION_BASE) as f32,
            contrast: CONTRAST_SPAN.mul_add(t, CONTRAST_BASE) as f32,
            brightness: BRIGHTNESS_SPAN.mul_add(t, BRIGHTNESS_BASE) as f32,
        },
    }
}
