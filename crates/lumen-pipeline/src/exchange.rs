//! The application-level image handed into and out of the pipeline.
//!
//! An [`ExchangeImage`] is a raw pixel buffer plus the display metadata
//! (scale and orientation) the host attached to it. The buffer is not
//! validated on construction: a malformed buffer is a legitimate input
//! and the pipeline must degrade gracefully when handed one.

use image::{DynamicImage, ExtendedColorType, GrayImage, ImageEncoder, RgbImage};
use serde::{Deserialize, Serialize};

use crate::types::{Dimensions, ExchangeError, RgbaImage};

/// Channel layout of an exchange pixel buffer. All layouts are 8 bits
/// per channel, rows tightly packed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PixelLayout {
    /// One luminance channel.
    Gray8,
    /// Red, green, blue.
    Rgb8,
    /// Red, green, blue, straight (non-premultiplied) alpha.
    #[default]
    Rgba8,
}

impl PixelLayout {
    /// Bytes per pixel.
    #[must_use]
    pub const fn channels(self) -> usize {
        match self {
            Self::Gray8 => 1,
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }
}

/// How stored pixels map onto the display, using the EXIF convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    /// EXIF 1: stored upright.
    #[default]
    Up,
    /// EXIF 2: mirrored horizontally.
    UpMirrored,
    /// EXIF 3: rotated 180°.
    Down,
    /// EXIF 4: mirrored vertically.
    DownMirrored,
    /// EXIF 5: mirrored, then rotated 90° counter-clockwise.
    LeftMirrored,
    /// EXIF 6: rotated 90° clockwise to display.
    Right,
    /// EXIF 7: mirrored, then rotated 90° clockwise.
    RightMirrored,
    /// EXIF 8: rotated 90° counter-clockwise to display.
    Left,
}

impl Orientation {
    /// Parse an EXIF orientation tag value (1 to 8).
    #[must_use]
    pub const fn from_exif(value: u8) -> Option<Self> {
        Some(match value {
            1 => Self::Up,
            2 => Self::UpMirrored,
            3 => Self::Down,
            4 => Self::DownMirrored,
            5 => Self::LeftMirrored,
            6 => Self::Right,
            7 => Self::RightMirrored,
            8 => Self::Left,
            _ => return None,
        })
    }

    /// The EXIF orientation tag value.
    #[must_use]
    pub const fn exif(self) -> u8 {
        match self {
            Self::Up => 1,
            Self::UpMirrored => 2,
            Self::Down => 3,
            Self::DownMirrored => 4,
            Self::LeftMirrored => 5,
            Self::Right => 6,
            Self::RightMirrored => 7,
            Self::Left => 8,
        }
    }
}

/// Pixel buffer plus display metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeImage {
    width: u32,
    height: u32,
    layout: PixelLayout,
    pixels: Vec<u8>,
    scale: f64,
    orientation: Orientation,
}

impl ExchangeImage {
    /// Wrap a raw buffer. Scale defaults to `1.0` and orientation to
    /// [`Orientation::Up`].
    ///
    /// The buffer length is not checked against the dimensions; see
    /// [`validate`](Self::validate).
    #[must_use]
    pub const fn new(width: u32, height: u32, layout: PixelLayout, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            layout,
            pixels,
            scale: 1.0,
            orientation: Orientation::Up,
        }
    }

    /// Wrap an RGBA buffer from the `image` crate.
    #[must_use]
    pub fn from_rgba(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(width, height, PixelLayout::Rgba8, image.into_raw())
    }

    /// Convert a decoded image, keeping gray and RGB layouts as-is and
    /// converting everything else to RGBA.
    #[must_use]
    pub fn from_dynamic(image: DynamicImage) -> Self {
        let (width, height) = (image.width(), image.height());
        match image {
            DynamicImage::ImageLuma8(gray) => {
                Self::new(width, height, PixelLayout::Gray8, gray.into_raw())
            }
            DynamicImage::ImageRgb8(rgb) => Self::new(width, height, PixelLayout::Rgb8, rgb.into_raw()),
            other => Self::from_rgba(other.into_rgba8()),
        }
    }

    /// Decode encoded image bytes (PNG, JPEG, BMP, WebP).
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError::EmptyInput`] if `bytes` is empty.
    /// Returns [`ExchangeError::Decode`] if the format is unrecognized or
    /// the data is corrupt.
    pub fn decode(bytes: &[u8]) -> Result<Self, ExchangeError> {
        if bytes.is_empty() {
            return Err(ExchangeError::EmptyInput);
        }
        let image = image::load_from_memory(bytes).map_err(ExchangeError::Decode)?;
        Ok(Self::from_dynamic(image))
    }

    /// Replace the display scale.
    #[must_use]
    pub const fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Replace the orientation.
    #[must_use]
    pub const fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Pixel width.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Pixel height.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Pixel dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    /// Channel layout of [`pixels`](Self::pixels).
    #[must_use]
    pub const fn layout(&self) -> PixelLayout {
        self.layout
    }

    /// Raw pixel bytes.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Display scale (points per pixel).
    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// Display orientation.
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Check that the buffer describes a non-empty image of the stated
    /// dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError::Malformed`] if either dimension is zero,
    /// the expected length overflows, or the buffer length differs from
    /// `width * height * channels`.
    pub fn validate(&self) -> Result<(), ExchangeError> {
        if self.dimensions().is_empty() {
            return Err(ExchangeError::Malformed(format!(
                "empty extent {}x{}",
                self.width, self.height
            )));
        }
        let expected = usize::try_from(self.dimensions().pixel_count())
            .ok()
            .and_then(|count| count.checked_mul(self.layout.channels()))
            .ok_or_else(|| {
                ExchangeError::Malformed(format!(
                    "extent {}x{} is too large to address",
                    self.width, self.height
                ))
            })?;
        if self.pixels.len() != expected {
            return Err(ExchangeError::Malformed(format!(
                "{:?} buffer for {}x{} needs {expected} bytes, got {}",
                self.layout,
                self.width,
                self.height,
                self.pixels.len()
            )));
        }
        Ok(())
    }

    /// Copy the pixels into an RGBA buffer, expanding gray and RGB
    /// layouts with opaque alpha.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError::Malformed`] if [`validate`](Self::validate)
    /// fails.
    pub fn to_rgba_image(&self) -> Result<RgbaImage, ExchangeError> {
        self.validate()?;
        let (w, h) = (self.width, self.height);
        let malformed = || ExchangeError::Malformed(format!("{w}x{h} buffer rejected"));
        let dynamic = match self.layout {
            PixelLayout::Gray8 => {
                DynamicImage::ImageLuma8(GrayImage::from_raw(w, h, self.pixels.clone()).ok_or_else(malformed)?)
            }
            PixelLayout::Rgb8 => {
                DynamicImage::ImageRgb8(RgbImage::from_raw(w, h, self.pixels.clone()).ok_or_else(malformed)?)
            }
            PixelLayout::Rgba8 => {
                return RgbaImage::from_raw(w, h, self.pixels.clone()).ok_or_else(malformed);
            }
        };
        Ok(dynamic.into_rgba8())
    }

    /// Encode as a JPEG still image. Alpha is discarded.
    ///
    /// `quality` is clamped to `1..=100`.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError::Malformed`] for an invalid buffer and
    /// [`ExchangeError::Encode`] if the encoder fails.
    pub fn encode_jpeg(&self, quality: u8) -> Result<Vec<u8>, ExchangeError> {
        let rgb = DynamicImage::ImageRgba8(self.to_rgba_image()?).into_rgb8();
        let mut buf = Vec::new();
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
        encoder
            .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
            .map_err(ExchangeError::Encode)?;
        Ok(buf)
    }

    /// Encode as a PNG, keeping alpha.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError::Malformed`] for an invalid buffer and
    /// [`ExchangeError::Encode`] if the encoder fails.
    pub fn encode_png(&self) -> Result<Vec<u8>, ExchangeError> {
        let rgba = self.to_rgba_image()?;
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        encoder
            .write_image(rgba.as_raw(), rgba.width(), rgba.height(), ExtendedColorType::Rgba8)
            .map_err(ExchangeError::Encode)?;
        Ok(buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn checker(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgba([255, 255, 255, 255])
            } else {
                image::Rgba([0, 0, 0, 255])
            }
        })
    }

    #[test]
    fn new_defaults_metadata() {
        let img = ExchangeImage::new(1, 1, PixelLayout::Gray8, vec![7]);
        assert!((img.scale() - 1.0).abs() < f64::EPSILON);
        assert_eq!(img.orientation(), Orientation::Up);
    }

    #[test]
    fn builders_replace_metadata() {
        let img = ExchangeImage::new(1, 1, PixelLayout::Gray8, vec![7])
            .with_scale(3.0)
            .with_orientation(Orientation::Left);
        assert!((img.scale() - 3.0).abs() < f64::EPSILON);
        assert_eq!(img.orientation(), Orientation::Left);
    }

    #[test]
    fn validate_rejects_empty_extent() {
        let img = ExchangeImage::new(0, 4, PixelLayout::Rgba8, vec![]);
        assert!(matches!(img.validate(), Err(ExchangeError::Malformed(_))));
    }

    #[test]
    fn validate_rejects_short_buffer() {
        let img = ExchangeImage::new(2, 2, PixelLayout::Rgb8, vec![0; 11]);
        assert!(matches!(img.validate(), Err(ExchangeError::Malformed(_))));
    }

    #[test]
    fn validate_accepts_exact_buffer() {
        let img = ExchangeImage::new(2, 2, PixelLayout::Rgb8, vec![0; 12]);
        assert!(img.validate().is_ok());
    }

    #[test]
    fn gray_expands_to_opaque_rgba() {
        let img = ExchangeImage::new(2, 1, PixelLayout::Gray8, vec![10, 200]);
        let rgba = img.to_rgba_image().unwrap();
        assert_eq!(rgba.get_pixel(0, 0).0, [10, 10, 10, 255]);
        assert_eq!(rgba.get_pixel(1, 0).0, [200, 200, 200, 255]);
    }

    #[test]
    fn from_rgba_keeps_pixels() {
        let rgba = checker(3, 2);
        let img = ExchangeImage::from_rgba(rgba.clone());
        assert_eq!(img.layout(), PixelLayout::Rgba8);
        assert_eq!(img.to_rgba_image().unwrap(), rgba);
    }

    #[test]
    fn decode_empty_input() {
        assert!(matches!(
            ExchangeImage::decode(&[]),
            Err(ExchangeError::EmptyInput)
        ));
    }

    #[test]
    fn decode_corrupt_input() {
        assert!(matches!(
            ExchangeImage::decode(&[0xFF, 0xFE, 0x00, 0x01]),
            Err(ExchangeError::Decode(_))
        ));
    }

    #[test]
    fn png_encode_then_decode_preserves_pixels() {
        let img = ExchangeImage::from_rgba(checker(4, 4));
        let bytes = img.encode_png().unwrap();
        let decoded = ExchangeImage::decode(&bytes).unwrap();
        assert_eq!(decoded.to_rgba_image().unwrap(), checker(4, 4));
    }

    #[test]
    fn jpeg_encode_produces_decodable_image() {
        let img = ExchangeImage::from_rgba(RgbaImage::from_pixel(
            8,
            6,
            image::Rgba([200, 100, 50, 255]),
        ));
        let bytes = img.encode_jpeg(90).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8], "expected JPEG SOI marker");
        let decoded = ExchangeImage::decode(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), img.dimensions());
    }

    #[test]
    fn jpeg_encode_rejects_malformed_buffer() {
        let img = ExchangeImage::new(4, 4, PixelLayout::Rgba8, vec![1, 2, 3]);
        assert!(matches!(
            img.encode_jpeg(90),
            Err(ExchangeError::Malformed(_))
        ));
    }

    #[test]
    fn orientation_exif_round_trip() {
        for value in 1..=8 {
            assert_eq!(Orientation::from_exif(value).unwrap().exif(), value);
        }
        assert!(Orientation::from_exif(0).is_none());
        assert!(Orientation::from_exif(9).is_none());
    }
}
