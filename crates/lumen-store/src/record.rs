//! Captured edit records.

use chrono::{DateTime, Utc};
use lumen_pipeline::{ExchangeImage, FilterVariant, Intensity};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;

/// Settings for capturing records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JPEG quality (1-100) for captured images.
    pub jpeg_quality: u8,
}

impl StoreConfig {
    /// Default JPEG quality.
    pub const DEFAULT_JPEG_QUALITY: u8 = 90;

    /// Check that every field is in range.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] if `jpeg_quality` is outside
    /// `1..=100`.
    pub fn validate(&self) -> Result<(), StoreError> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(StoreError::InvalidConfig(format!(
                "jpeg_quality must be in 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: Self::DEFAULT_JPEG_QUALITY,
        }
    }
}

/// One saved edit: the filter that was applied, at what intensity, and the
/// encoded result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditedPhoto {
    /// Unique record id (random v4).
    pub id: Uuid,
    /// When the edit was saved.
    pub created_at: DateTime<Utc>,
    /// Display name of the applied filter.
    pub filter_name: String,
    /// Slider value the filter was applied at, already clamped to `[0, 1]`.
    pub intensity: f64,
    /// Encoded image (JPEG when captured).
    pub image_bytes: Vec<u8>,
}

impl EditedPhoto {
    /// Build a record from already-encoded bytes with a fresh id and the
    /// current time.
    #[must_use]
    pub fn new(filter: FilterVariant, intensity: Intensity, image_bytes: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            filter_name: filter.display_name().to_owned(),
            intensity: intensity.get(),
            image_bytes,
        }
    }

    /// Encode `edited` as JPEG and build a record for it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] for a bad `config` and
    /// [`StoreError::Encode`] if the image cannot be encoded.
    pub fn capture(
        filter: FilterVariant,
        intensity: Intensity,
        edited: &ExchangeImage,
        config: &StoreConfig,
    ) -> Result<Self, StoreError> {
        config.validate()?;
        let bytes = edited
            .encode_jpeg(config.jpeg_quality)
            .map_err(StoreError::Encode)?;
        Ok(Self::new(filter, intensity, bytes))
    }

    /// The filter variant this record names, if it is still in the catalog.
    #[must_use]
    pub fn filter(&self) -> Option<FilterVariant> {
        self.filter_name.parse().ok()
    }

    /// Decode the stored bytes for display.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Decode`] if the bytes are empty or not a
    /// supported image format.
    pub fn decode_image(&self) -> Result<ExchangeImage, StoreError> {
        ExchangeImage::decode(&self.image_bytes).map_err(StoreError::Decode)
    }

    /// Metadata view without the image payload.
    #[must_use]
    pub fn summary(&self) -> RecordSummary {
        RecordSummary {
            id: self.id,
            created_at: self.created_at,
            filter_name: self.filter_name.clone(),
            intensity: self.intensity,
            byte_len: self.image_bytes.len(),
        }
    }
}

/// Serializable record metadata, for listings and logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSummary {
    /// Id of the summarized record.
    pub id: Uuid,
    /// When the edit was saved.
    pub created_at: DateTime<Utc>,
    /// Display name of the applied filter.
    pub filter_name: String,
    /// Clamped slider value.
    pub intensity: f64,
    /// Size of the encoded image in bytes.
    pub byte_len: usize,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use lumen_pipeline::PixelLayout;

    fn edited() -> ExchangeImage {
        let pixels = [180u8, 120, 60].repeat(12 * 9);
        ExchangeImage::new(12, 9, PixelLayout::Rgb8, pixels)
    }

    #[test]
    fn default_config_is_valid() {
        let config = StoreConfig::default();
        assert_eq!(config.jpeg_quality, 90);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_quality_is_rejected() {
        let config = StoreConfig { jpeg_quality: 0 };
        assert!(matches!(
            config.validate(),
            Err(StoreError::InvalidConfig(_))
        ));
        assert!(matches!(
            EditedPhoto::capture(FilterVariant::Sepia, Intensity::new(0.5), &edited(), &config),
            Err(StoreError::InvalidConfig(_))
        ));
    }

    #[test]
    fn config_fills_missing_fields() {
        let config: StoreConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn capture_round_trips_through_jpeg() {
        let record = EditedPhoto::capture(
            FilterVariant::Bloom,
            Intensity::new(0.4),
            &edited(),
            &StoreConfig::default(),
        )
        .unwrap();

        assert_eq!(record.filter_name, "Bloom");
        assert_eq!(record.filter(), Some(FilterVariant::Bloom));
        assert!((record.intensity - 0.4).abs() < f64::EPSILON);
        assert_eq!(&record.image_bytes[..2], &[0xFF, 0xD8]);

        let decoded = record.decode_image().unwrap();
        assert_eq!((decoded.width(), decoded.height()), (12, 9));
        let rgba = decoded.to_rgba_image().unwrap();
        let px = rgba.get_pixel(6, 4);
        for (got, want) in px.0.iter().zip([180u8, 120, 60]) {
            assert!(got.abs_diff(want) <= 6, "{got} vs {want}");
        }
    }

    #[test]
    fn intensity_is_stored_clamped() {
        let record = EditedPhoto::new(FilterVariant::Vignette, Intensity::new(3.0), Vec::new());
        assert!((record.intensity - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_bytes_fail_to_decode() {
        let record = EditedPhoto::new(FilterVariant::Noir, Intensity::new(0.0), Vec::new());
        assert!(matches!(record.decode_image(), Err(StoreError::Decode(_))));
    }

    #[test]
    fn records_get_distinct_ids() {
        let a = EditedPhoto::new(FilterVariant::Noir, Intensity::new(0.0), Vec::new());
        let b = EditedPhoto::new(FilterVariant::Noir, Intensity::new(0.0), Vec::new());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn summary_omits_payload() {
        let record = EditedPhoto::new(
            FilterVariant::ColorAdjust,
            Intensity::new(0.5),
            vec![1, 2, 3],
        );
        let json = serde_json::to_value(record.summary()).unwrap();
        assert_eq!(json["filter_name"], "Color Adjust");
        assert_eq!(json["byte_len"], 3);
        assert!(json.get("image_bytes").is_none());
    }
}
