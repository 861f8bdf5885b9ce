//! Accessibility reports built on top of the color science primitives.

use serde::{Deserialize, Serialize};

use crate::color::science::{
    AA_THRESHOLD, ContrastLevel, CvdVariant, HexColor, MAX_CONTRAST, contrast_level,
    contrast_ratio, min_pairwise_contrast, simulate_palette,
};

/// Ratio under which the strong light/dark advice is added.
const STRONG_PAIRING_THRESHOLD: f64 = 3.0;

/// Advice when contrast is below AA.
pub const ADVICE_LIGHTNESS: &str = "Increase the lightness gap or the saturation contrast between colors";
/// Advice when contrast is below AA.
pub const ADVICE_HUE: &str = "Avoid neighbouring hues; spread the hues further apart";
/// Advice when contrast is below 3:1.
pub const ADVICE_STRONG_PAIRING: &str = "Prefer strong pairings of a light color with a dark color";
/// Affirmation when no rule triggers.
pub const ADVICE_ACCESSIBLE: &str =
    "This palette is currently friendly to color-blind users and can be used as-is";

/// Contrast of one unordered pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PairContrast {
    /// First color of the pair (lower palette index).
    pub color1: HexColor,
    /// Second color of the pair.
    pub color2: HexColor,
    /// WCAG contrast ratio.
    pub ratio: f64,
    /// WCAG band.
    pub level: ContrastLevel,
    /// `ratio / 21 * 100`.
    pub score: f64,
}

/// Full pairwise contrast matrix, weakest pair first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContrastReport {
    /// Every pair, sorted ascending by ratio.
    pub results: Vec<PairContrast>,
    /// Number of pairs.
    pub total_pairs: usize,
    /// Pairs with ratio >= 4.5.
    pub pass_count: usize,
    /// Ratio of the weakest pair.
    pub min_ratio: f64,
    /// Band of the weakest pair.
    pub min_level: ContrastLevel,
}

impl ContrastReport {
    /// Weakest pair.
    #[must_use]
    pub fn worst(&self) -> Option<&PairContrast> {
        self.results.first()
    }
}

/// Build the contrast report. `None` when the palette has fewer than two colors.
#[must_use]
pub fn contrast_report(palette: &[HexColor]) -> Option<ContrastReport> {
    let mut results = Vec::with_capacity(palette.len() * palette.len().saturating_sub(1) / 2);
    for (i, color1) in palette.iter().enumerate() {
        for color2 in &palette[i + 1..] {
            let ratio = contrast_ratio(color1, color2);
            results.push(PairContrast {
                color1: color1.clone(),
                color2: color2.clone(),
                ratio,
                level: contrast_level(ratio),
                score: ratio / MAX_CONTRAST * 100.0,
            });
        }
    }

    results.sort_by(|a, b| a.ratio.total_cmp(&b.ratio));
    let worst = results.first()?;
    let min_ratio = worst.ratio;
    let min_level = worst.level;
    let pass_count = results.iter().filter(|r| r.ratio >= AA_THRESHOLD).count();

    Some(ContrastReport {
        total_pairs: results.len(),
        pass_count,
        min_ratio,
        min_level,
        results,
    })
}

/// Simulated palettes plus the accessibility verdict.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredColorblindReport")]
pub struct ColorblindReport {
    /// Palette as seen with deuteranopia.
    pub deuteranopia: Vec<HexColor>,
    /// Palette as seen with protanopia.
    pub protanopia: Vec<HexColor>,
    /// Palette as seen with tritanopia.
    pub tritanopia: Vec<HexColor>,
    /// Palette as seen with achromatopsia.
    pub achromatopsia: Vec<HexColor>,
    /// Minimum pairwise contrast across all four simulations.
    pub min_contrast: f64,
    /// `min_contrast >= 4.5`.
    pub is_accessible: bool,
    /// Ordered advice.
    pub recommendations: Vec<String>,
}

impl ColorblindReport {
    /// Assemble a report from the four simulated palettes (in
    /// [`CvdVariant::ALL`] order) and their minimum pairwise contrast.
    #[must_use]
    pub fn from_parts(simulated: [Vec<HexColor>; 4], min_contrast: f64) -> Self {
        let [deuteranopia, protanopia, tritanopia, achromatopsia] = simulated;
        Self {
            deuteranopia,
            protanopia,
            tritanopia,
            achromatopsia,
            min_contrast,
            is_accessible: min_contrast >= AA_THRESHOLD,
            recommendations: recommendations(min_contrast),
        }
    }

    /// Simulated palette for one variant.
    #[must_use]
    pub fn simulated(&self, variant: CvdVariant) -> &[HexColor] {
        match variant {
            CvdVariant::Deuteranopia => &self.deuteranopia,
            CvdVariant::Protanopia => &self.protanopia,
            CvdVariant::Tritanopia => &self.tritanopia,
            CvdVariant::Achromatopsia => &self.achromatopsia,
        }
    }
}

/// Build the advice list for a minimum contrast.
#[must_use]
pub fn recommendations(min_contrast: f64) -> Vec<String> {
    let mut advice = Vec::new();
    if min_contrast < AA_THRESHOLD {
        advice.push(ADVICE_LIGHTNESS.to_string());
        advice.push(ADVICE_HUE.to_string());
    }
    if min_contrast < STRONG_PAIRING_THRESHOLD {
        advice.push(ADVICE_STRONG_PAIRING.to_string());
    }
    if advice.is_empty() {
        advice.push(ADVICE_ACCESSIBLE.to_string());
    }
    advice
}

/// Build the colorblind report. `None` for an empty palette.
#[must_use]
pub fn colorblind_report(palette: &[HexColor]) -> Option<ColorblindReport> {
    if palette.is_empty() {
        return None;
    }

    let simulated = CvdVariant::ALL.map(|variant| simulate_palette(palette, variant));
    let min_contrast = min_simulated_contrast(&simulated);
    Some(ColorblindReport::from_parts(simulated, min_contrast))
}

fn min_simulated_contrast(simulated: &[Vec<HexColor>; 4]) -> f64 {
    simulated
        .iter()
        .map(|palette| min_pairwise_contrast(palette))
        .fold(f64::INFINITY, f64::min)
}

/// Stored form of a colorblind report. Records written before the minimum
/// contrast was kept lack `minContrast`; it is recomputed from the simulations.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredColorblindReport {
    deuteranopia: Vec<HexColor>,
    protanopia: Vec<HexColor>,
    tritanopia: Vec<HexColor>,
    achromatopsia: Vec<HexColor>,
    #[serde(default)]
    min_contrast: Option<f64>,
    #[serde(default)]
    is_accessible: Option<bool>,
    #[serde(default)]
    recommendations: Option<Vec<String>>,
}

impl From<StoredColorblindReport> for ColorblindReport {
    fn from(stored: StoredColorblindReport) -> Self {
        let simulated = [
            stored.deuteranopia,
            stored.protanopia,
            stored.tritanopia,
            stored.achromatopsia,
        ];
        let min_contrast = stored
            .min_contrast
            .unwrap_or_else(|| min_simulated_contrast(&simulated));
        let mut report = Self::from_parts(simulated, min_contrast);
        if let Some(is_accessible) = stored.is_accessible {
            report.is_accessible = is_accessible;
        }
        if let Some(recommendations) = stored.recommendations {
            report.recommendations = recommendations;
        }
        report
    }
}
