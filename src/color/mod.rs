//! Color science engine and accessibility analysis.
//!
//! - `science`: hex/RGB/linear conversions, luminance, contrast, CVD simulation
//! - `analysis`: contrast matrix and colorblind reports used by the chat actions

pub mod analysis;
pub mod science;

pub use analysis::{
    ColorblindReport, ContrastReport, PairContrast, colorblind_report, contrast_report,
    recommendations,
};
pub use science::{
    ColorError, ContrastLevel, CvdVariant, HexColor, Hsl, HslDelta, Rgb, contrast_level,
    contrast_ratio, hex_to_hsl, hsl_difference, luminance, min_pairwise_contrast, parse_hex,
    simulate_cvd, simulate_palette,
};
