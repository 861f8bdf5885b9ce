//! Color science primitives: hex parsing, relative luminance, WCAG contrast and
//! color-vision-deficiency simulation.
//!
//! Every function here is pure and deterministic. The transfer functions and
//! matrices are fixed so that the same input always produces the same hex output.
//!
//! Conversion pipeline for simulation:
//!
//!   `#RRGGBB` -> 8-bit sRGB -> linear RGB -> 3x3 matrix -> clamp -> sRGB -> `#RRGGBB`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Luminance weights for linear R, G and B.
const LUMINANCE_WEIGHTS: [f64; 3] = [0.2126, 0.7152, 0.0722];

/// Ratio at or above which a pair meets WCAG AAA.
pub const AAA_THRESHOLD: f64 = 7.0;
/// Ratio at or above which a pair meets WCAG AA.
pub const AA_THRESHOLD: f64 = 4.5;
/// Maximum possible contrast ratio (black on white).
pub const MAX_CONTRAST: f64 = 21.0;

/// Errors raised while parsing color strings.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ColorError {
    /// The value is not `#RGB` or `#RRGGBB`.
    #[error("invalid hex color: {0:?}")]
    InvalidHex(String),
}

/// An 8-bit sRGB triple.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Build a triple from raw channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    const fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    fn linear(self) -> [f64; 3] {
        self.channels().map(srgb_to_linear)
    }
}

/// A validated color in canonical `#RRGGBB` uppercase form.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    /// Parse and normalise a hex string.
    ///
    /// # Errors
    /// Returns [`ColorError::InvalidHex`] if the value is not a hex color.
    pub fn parse(value: &str) -> Result<Self, ColorError> {
        parse_hex(value).map(Self::from_rgb)
    }

    /// Encode an RGB triple.
    #[must_use]
    pub fn from_rgb(rgb: Rgb) -> Self {
        Self(format!("#{:02X}{:02X}{:02X}", rgb.r, rgb.g, rgb.b))
    }

    /// Decode back to channels.
    #[must_use]
    pub fn rgb(&self) -> Rgb {
        // Canonical form is guaranteed by construction.
        parse_hex(&self.0).unwrap_or(Rgb::new(0, 0, 0))
    }

    /// Borrow the canonical string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for HexColor {
    type Err = ColorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for HexColor {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(value: HexColor) -> Self {
        value.0
    }
}

/// Parse `#RGB` / `#RRGGBB` (leading `#` optional, any case).
///
/// # Errors
/// Returns [`ColorError::InvalidHex`] for any other shape.
pub fn parse_hex(value: &str) -> Result<Rgb, ColorError> {
    let invalid = || ColorError::InvalidHex(value.to_string());
    let digits = value.trim();
    let digits = digits.strip_prefix('#').unwrap_or(digits);
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return Err(invalid()),
    };
    let packed = u32::from_str_radix(&expanded, 16).map_err(|_| invalid())?;
    let [_, r, g, b] = packed.to_be_bytes();
    Ok(Rgb::new(r, g, b))
}

/// sRGB channel (0..=255) to linear light.
fn srgb_to_linear(channel: u8) -> f64 {
    let c = f64::from(channel) / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Linear light to sRGB in `[0, 1]`; input is clamped first.
fn linear_to_srgb(channel: f64) -> f64 {
    let c = channel.clamp(0.0, 1.0);
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

fn to_byte(unit: f64) -> u8 {
    (unit.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Relative luminance in `[0, 1]`.
#[must_use]
pub fn luminance(color: &HexColor) -> f64 {
    let linear = color.rgb().linear();
    linear
        .iter()
        .zip(LUMINANCE_WEIGHTS)
        .map(|(c, w)| c * w)
        .sum()
}

/// WCAG contrast ratio. Symmetric, always within `[1, 21]`.
#[must_use]
pub fn contrast_ratio(a: &HexColor, b: &HexColor) -> f64 {
    let la = luminance(a);
    let lb = luminance(b);
    (la.max(lb) + 0.05) / (la.min(lb) + 0.05)
}

/// WCAG classification band.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ContrastLevel {
    /// Ratio >= 7.
    #[serde(rename = "AAA")]
    Aaa,
    /// Ratio >= 4.5.
    #[serde(rename = "AA")]
    Aa,
    /// Anything lower.
    #[serde(rename = "FAIL")]
    Fail,
}

impl ContrastLevel {
    /// Stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aaa => "AAA",
            Self::Aa => "AA",
            Self::Fail => "FAIL",
        }
    }
}

impl fmt::Display for ContrastLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a ratio; lower bounds are inclusive.
#[must_use]
pub fn contrast_level(ratio: f64) -> ContrastLevel {
    if ratio >= AAA_THRESHOLD {
        ContrastLevel::Aaa
    } else if ratio >= AA_THRESHOLD {
        ContrastLevel::Aa
    } else {
        ContrastLevel::Fail
    }
}

/// Color-vision deficiency simulated by [`simulate_cvd`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CvdVariant {
    /// Green-blind.
    Deuteranopia,
    /// Red-blind.
    Protanopia,
    /// Blue-blind.
    Tritanopia,
    /// Total color blindness.
    Achromatopsia,
}

type Matrix = [[f64; 3]; 3];

const DEUTERANOPIA: Matrix = [[0.625, 0.375, 0.0], [0.7, 0.3, 0.0], [0.0, 0.3, 0.7]];
const PROTANOPIA: Matrix = [
    [0.566_67, 0.433_33, 0.0],
    [0.558_33, 0.441_67, 0.0],
    [0.0, 0.241_67, 0.758_33],
];
const TRITANOPIA: Matrix = [
    [0.95, 0.05, 0.0],
    [0.0, 0.433_33, 0.566_67],
    [0.0, 0.475, 0.525],
];
const GRAY_ROW: [f64; 3] = [0.299, 0.587, 0.114];
const ACHROMATOPSIA: Matrix = [GRAY_ROW, GRAY_ROW, GRAY_ROW];

impl CvdVariant {
    /// All variants in report order.
    pub const ALL: [Self; 4] = [
        Self::Deuteranopia,
        Self::Protanopia,
        Self::Tritanopia,
        Self::Achromatopsia,
    ];

    /// Stable key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Deuteranopia => "deuteranopia",
            Self::Protanopia => "protanopia",
            Self::Tritanopia => "tritanopia",
            Self::Achromatopsia => "achromatopsia",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Deuteranopia => "Deuteranopia (red-green, green-blind)",
            Self::Protanopia => "Protanopia (red-green, red-blind)",
            Self::Tritanopia => "Tritanopia (blue-yellow)",
            Self::Achromatopsia => "Achromatopsia (no color)",
        }
    }

    const fn matrix(self) -> Matrix {
        match self {
            Self::Deuteranopia => DEUTERANOPIA,
            Self::Protanopia => PROTANOPIA,
            Self::Tritanopia => TRITANOPIA,
            Self::Achromatopsia => ACHROMATOPSIA,
        }
    }
}

/// Simulate how `color` appears under `variant`.
#[must_use]
pub fn simulate_cvd(color: &HexColor, variant: CvdVariant) -> HexColor {
    let [r, g, b] = color.rgb().linear();
    let out = variant
        .matrix()
        .map(|row| to_byte(linear_to_srgb(row[0] * r + row[1] * g + row[2] * b)));
    HexColor::from_rgb(Rgb::new(out[0], out[1], out[2]))
}

/// Simulate a whole palette, preserving order.
#[must_use]
pub fn simulate_palette(palette: &[HexColor], variant: CvdVariant) -> Vec<HexColor> {
    palette.iter().map(|c| simulate_cvd(c, variant)).collect()
}

/// Lowest contrast ratio over all unordered pairs; `0.0` when fewer than two colors.
#[must_use]
pub fn min_pairwise_contrast(palette: &[HexColor]) -> f64 {
    let mut min = f64::INFINITY;
    for (i, a) in palette.iter().enumerate() {
        for b in &palette[i + 1..] {
            min = min.min(contrast_ratio(a, b));
        }
    }
    if min.is_finite() { min } else { 0.0 }
}

/// Hue (degrees), saturation and lightness (percent), rounded.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    /// Hue in `0..=360`.
    pub h: i32,
    /// Saturation in `0..=100`.
    pub s: i32,
    /// Lightness in `0..=100`.
    pub l: i32,
}

/// Signed HSL difference between two colors.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct HslDelta {
    /// Hue delta along the shorter arc.
    pub dh: i32,
    /// Saturation delta.
    pub ds: i32,
    /// Lightness delta.
    pub dl: i32,
}

/// Convert to HSL.
#[must_use]
pub fn hex_to_hsl(color: &HexColor) -> Hsl {
    let [r, g, b] = color.rgb().channels().map(|c| f64::from(c) / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let l = (max + min) / 2.0;

    let (h, s) = if delta == 0.0 {
        (0.0, 0.0)
    } else {
        let s = if l > 0.5 {
            delta / (2.0 - max - min)
        } else {
            delta / (max + min)
        };
        let h = if max == r {
            (g - b) / delta + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / delta + 2.0
        } else {
            (r - g) / delta + 4.0
        };
        (h / 6.0, s)
    };

    Hsl {
        h: (h * 360.0).round() as i32,
        s: (s * 100.0).round() as i32,
        l: (l * 100.0).round() as i32,
    }
}

/// HSL delta from `from` to `to`.
#[must_use]
pub fn hsl_difference(from: &HexColor, to: &HexColor) -> HslDelta {
    let a = hex_to_hsl(from);
    let b = hex_to_hsl(to);
    let mut dh = b.h - a.h;
    if dh > 180 {
        dh -= 360;
    }
    if dh < -180 {
        dh += 360;
    }
    HslDelta {
        dh,
        ds: b.s - a.s,
        dl: b.l - a.l,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(value: &str) -> HexColor {
        HexColor::parse(value).unwrap()
    }

    #[test]
    fn test_parse_normalises() {
        assert_eq!(hex("#ffc2c2").as_str(), "#FFC2C2");
        assert_eq!(hex("0af").as_str(), "#00AAFF");
        assert_eq!(hex(" #AbCdEf ").rgb(), Rgb::new(0xAB, 0xCD, 0xEF));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(HexColor::parse("#12345").is_err());
        assert!(HexColor::parse("#GGGGGG").is_err());
        assert!(HexColor::parse("").is_err());
        assert!(HexColor::parse("#+12345").is_err());
    }

    #[test]
    fn test_serde_uses_canonical_string() {
        let color: HexColor = serde_json::from_str("\"#b9f9ff\"").unwrap();
        assert_eq!(serde_json::to_string(&color).unwrap(), "\"#B9F9FF\"");
        assert!(serde_json::from_str::<HexColor>("\"nope\"").is_err());
    }

    #[test]
    fn test_black_white_contrast() {
        let ratio = contrast_ratio(&hex("#000000"), &hex("#FFFFFF"));
        assert!((ratio - 21.0).abs() < 1e-9);
        assert_eq!(contrast_level(ratio), ContrastLevel::Aaa);
    }

    #[test]
    fn test_contrast_symmetric_and_bounded() {
        let colors = ["#FFC2C2", "#1E3A5F", "#2D5B8A", "#E5E5E5", "#777777", "#000000"];
        for a in colors {
            for b in colors {
                let ab = contrast_ratio(&hex(a), &hex(b));
                let ba = contrast_ratio(&hex(b), &hex(a));
                assert!((ab - ba).abs() < f64::EPSILON);
                assert!((1.0..=MAX_CONTRAST + 1e-9).contains(&ab));
            }
        }
    }

    #[test]
    fn test_contrast_level_boundaries() {
        assert_eq!(contrast_level(6.999_999), ContrastLevel::Aa);
        assert_eq!(contrast_level(7.0), ContrastLevel::Aaa);
        assert_eq!(contrast_level(4.5), ContrastLevel::Aa);
        assert_eq!(contrast_level(4.499_999), ContrastLevel::Fail);
        assert_eq!(contrast_level(1.0), ContrastLevel::Fail);
    }

    #[test]
    fn test_luminance_extremes() {
        assert!(luminance(&hex("#000000")).abs() < f64::EPSILON);
        assert!((luminance(&hex("#FFFFFF")) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_simulation_output_is_canonical_hex() {
        for variant in CvdVariant::ALL {
            for input in ["#FF5733", "#00FF00", "#123456", "#FFFFFF", "#000000"] {
                let out = simulate_cvd(&hex(input), variant);
                let s = out.as_str();
                assert_eq!(s.len(), 7);
                assert!(s.starts_with('#'));
                assert!(s[1..].chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
            }
        }
    }

    #[test]
    fn test_achromatopsia_is_gray() {
        for input in ["#FF5733", "#00FF00", "#123456", "#B9F9FF"] {
            let rgb = simulate_cvd(&hex(input), CvdVariant::Achromatopsia).rgb();
            assert_eq!(rgb.r, rgb.g);
            assert_eq!(rgb.g, rgb.b);
        }
    }

    #[test]
    fn test_simulation_known_values() {
        // Rows of the deuteranopia matrix sum to 1, so white and black are fixed points.
        assert_eq!(
            simulate_cvd(&hex("#FFFFFF"), CvdVariant::Deuteranopia).as_str(),
            "#FFFFFF"
        );
        assert_eq!(
            simulate_cvd(&hex("#000000"), CvdVariant::Tritanopia).as_str(),
            "#000000"
        );
        // Pure red under deuteranopia: linear (0.625, 0.7, 0).
        let red = simulate_cvd(&hex("#FF0000"), CvdVariant::Deuteranopia);
        assert_eq!(red.rgb().b, 0);
        assert!(red.rgb().g > red.rgb().r);
    }

    #[test]
    fn test_min_pairwise_contrast() {
        assert!(min_pairwise_contrast(&[]).abs() < f64::EPSILON);
        assert!(min_pairwise_contrast(&[hex("#000000")]).abs() < f64::EPSILON);
        let palette = [hex("#000000"), hex("#FFFFFF"), hex("#000000")];
        assert!((min_pairwise_contrast(&palette) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_hsl_conversion() {
        assert_eq!(hex_to_hsl(&hex("#FF0000")), Hsl { h: 0, s: 100, l: 50 });
        assert_eq!(hex_to_hsl(&hex("#00FF00")), Hsl { h: 120, s: 100, l: 50 });
        assert_eq!(hex_to_hsl(&hex("#808080")), Hsl { h: 0, s: 0, l: 50 });
    }

    #[test]
    fn test_hsl_difference_takes_short_arc() {
        // Hue 350 -> 10 is +20, not -340.
        let delta = hsl_difference(&hex("#FF002B"), &hex("#FF2A00"));
        assert!(delta.dh > 0 && delta.dh <= 30);
    }
}
