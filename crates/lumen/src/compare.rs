//! Before/after comparison: the original image fading into the edited
//! one along a straight ramp.

use image::{Rgba, RgbaImage};

/// Placement of the fade ramp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    /// Midpoint of the ramp as fractions of image width and height.
    pub center: (f64, f64),
    /// Clockwise direction of travel from original to edited, in radians.
    /// Zero runs left to right.
    pub angle: f64,
}

impl Default for Fade {
    fn default() -> Self {
        Self {
            center: (0.5, 0.5),
            angle: 0.0,
        }
    }
}

/// Clap value parser: a percentage in `0..=100`, returned as a fraction.
pub fn parse_percent(s: &str) -> Result<f64, String> {
    let pct: f64 = s
        .trim()
        .trim_end_matches('%')
        .parse()
        .map_err(|e| format!("'{s}' is not a number: {e}"))?;
    if !(0.0..=100.0).contains(&pct) {
        return Err(format!("{pct} is outside 0..=100"));
    }
    Ok(pct / 100.0)
}

/// Clap value parser: finite degrees, returned as radians.
pub fn parse_degrees(s: &str) -> Result<f64, String> {
    let deg: f64 = s
        .trim()
        .parse()
        .map_err(|e| format!("'{s}' is not a number: {e}"))?;
    if !deg.is_finite() {
        return Err(format!("angle must be finite, got {deg}"));
    }
    Ok(deg.to_radians())
}

/// Blend weight along the ramp for one image size: 0 is all original,
/// 1 is all edited, 0.5 at the midpoint. The ramp reaches 0 and 1 at the
/// farthest corners behind and ahead of the midpoint.
struct Ramp {
    origin: (f64, f64),
    direction: (f64, f64),
    scale: f64,
}

impl Ramp {
    fn new(fade: &Fade, width: u32, height: u32) -> Self {
        let (w, h) = (f64::from(width), f64::from(height));
        let origin = (fade.center.0 * w, fade.center.1 * h);
        let (sin, cos) = fade.angle.sin_cos();
        let mut ramp = Self {
            origin,
            direction: (cos, sin),
            scale: 0.0,
        };
        let reach = [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)]
            .into_iter()
            .map(|(x, y)| ramp.along(x, y).abs())
            .fold(0.0_f64, f64::max);
        if reach > f64::EPSILON {
            ramp.scale = 0.5 / reach;
        }
        ramp
    }

    /// Signed distance of `(x, y)` past the midpoint along the ramp.
    fn along(&self, x: f64, y: f64) -> f64 {
        (x - self.origin.0).mul_add(self.direction.0, (y - self.origin.1) * self.direction.1)
    }

    fn weight(&self, x: f64, y: f64) -> f64 {
        self.along(x, y).mul_add(self.scale, 0.5).clamp(0.0, 1.0)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn mix(from: u8, to: u8, t: f64) -> u8 {
    (f64::from(to) - f64::from(from))
        .mul_add(t, f64::from(from))
        .round()
        .clamp(0.0, 255.0) as u8
}

/// Fade `original` into `edited`, sampling the ramp at pixel centres.
/// Both images must share dimensions.
pub fn blend_images(original: &RgbaImage, edited: &RgbaImage, fade: &Fade) -> RgbaImage {
    let (width, height) = original.dimensions();
    let ramp = Ramp::new(fade, width, height);
    RgbaImage::from_fn(width, height, |x, y| {
        let t = ramp.weight(f64::from(x) + 0.5, f64::from(y) + 0.5);
        let (before, after) = (original.get_pixel(x, y).0, edited.get_pixel(x, y).0);
        Rgba(std::array::from_fn(|c| mix(before[c], after[c], t)))
    })
}
