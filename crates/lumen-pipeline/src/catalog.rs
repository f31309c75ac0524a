//! Filter catalog: the closed set of filters the pipeline offers.
//!
//! The enumeration order of [`FilterVariant::ALL`] is the order a UI
//! should present the filters in. [`FilterVariant::supports_intensity`]
//! tells the UI whether to show the intensity slider.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One named visual effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FilterVariant {
    /// No effect. The pipeline returns the input image untouched.
    #[default]
    Original,
    /// High-contrast black and white. Fixed look, no intensity control.
    Noir,
    /// Warm brown toning.
    Sepia,
    /// Soft glow around bright regions.
    Bloom,
    /// Darkened edges.
    Vignette,
    /// Combined saturation, contrast and brightness adjustment.
    ColorAdjust,
}

impl FilterVariant {
    /// Every variant, in stable UI order.
    pub const ALL: [Self; 6] = [
        Self::Original,
        Self::Noir,
        Self::Sepia,
        Self::Bloom,
        Self::Vignette,
        Self::ColorAdjust,
    ];

    /// Iterate over every variant in UI order.
    pub fn all() -> impl Iterator<Item = Self> {
        Self::ALL.into_iter()
    }

    /// Whether this filter exposes an intensity control.
    ///
    /// `false` for [`Original`](Self::Original) and [`Noir`](Self::Noir),
    /// whose output does not depend on intensity.
    #[must_use]
    pub const fn supports_intensity(self) -> bool {
        !matches!(self, Self::Original | Self::Noir)
    }

    /// Human-readable label, also used as the persisted filter name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Original => "Original",
            Self::Noir => "Noir",
            Self::Sepia => "Sepia",
            Self::Bloom => "Bloom",
            Self::Vignette => "Vignette",
            Self::ColorAdjust => "Color Adjust",
        }
    }
}

impl fmt::Display for FilterVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Error returned when a string names no known filter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown filter: {0:?}")]
pub struct UnknownFilter(pub String);

impl FromStr for FilterVariant {
    type Err = UnknownFilter;

    /// Parse a display name. Case, spaces, `-` and `_` are ignored, so
    /// `"Color Adjust"`, `"color-adjust"` and `"ColorAdjust"` all match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self::all()
            .find(|variant| {
                variant
                    .display_name()
                    .chars()
                    .filter(|c| *c != ' ')
                    .map(|c| c.to_ascii_lowercase())
                    .eq(key.chars())
            })
            .ok_or_else(|| UnknownFilter(s.to_owned()))
    }
}
