//! Band palette — the color table behind severity bands.
//!
//! Loaded once with the rest of the configuration and read-only afterwards.

use crate::classify::SeverityBand;
use serde::{Deserialize, Serialize};

pub const WHITE: &str = "#FFFFFF";
pub const BLACK: &str = "#000000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandPalette {
    pub no_data: String,

    pub ratio_excellent: String,
    pub ratio_good: String,
    pub ratio_warning: String,
    pub ratio_poor: String,
    pub ratio_severe: String,

    pub gap_positive: String,
    pub gap_minor_negative: String,
    pub gap_moderate_negative: String,
    pub gap_large_negative: String,
    pub gap_severe_negative: String,

    /// Text drawn on the dark backgrounds.
    pub text_light: String,
    /// Text drawn on every other background.
    pub text_dark: String,
}

impl BandPalette {
    /// NCRC brand palette (green / gold / red).
    pub fn ncrc() -> Self {
        Self {
            no_data: WHITE.into(),

            ratio_excellent: "#C6EFCE".into(),
            ratio_good: "#ffc23a".into(),
            ratio_warning: "#ffc23a".into(),
            ratio_poor: "#e82e2e".into(),
            ratio_severe: "#e82e2e".into(),

            gap_positive: "#C6EFCE".into(),
            gap_minor_negative: "#ffc23a".into(),
            gap_moderate_negative: "#ffc23a".into(),
            gap_large_negative: "#e82e2e".into(),
            gap_severe_negative: "#e82e2e".into(),

            text_light: WHITE.into(),
            text_dark: BLACK.into(),
        }
    }

    pub fn background(&self, band: SeverityBand) -> &str {
        match band {
            SeverityBand::NoData           => &self.no_data,
            SeverityBand::Excellent        => &self.ratio_excellent,
            SeverityBand::Good             => &self.ratio_good,
            SeverityBand::Warning          => &self.ratio_warning,
            SeverityBand::Poor             => &self.ratio_poor,
            SeverityBand::Severe           => &self.ratio_severe,
            SeverityBand::Positive         => &self.gap_positive,
            SeverityBand::MinorNegative    => &self.gap_minor_negative,
            SeverityBand::ModerateNegative => &self.gap_moderate_negative,
            SeverityBand::LargeNegative    => &self.gap_large_negative,
            SeverityBand::SevereNegative   => &self.gap_severe_negative,
        }
    }

    /// Text color for a cell background. Light text only on the two severe
    /// backgrounds; any band that shares their color gets light text too.
    pub fn text_color(&self, background: &str) -> &str {
        let dark = [&self.gap_severe_negative, &self.ratio_severe];
        if dark.iter().any(|c| c.eq_ignore_ascii_case(background)) {
            &self.text_light
        } else {
            &self.text_dark
        }
    }

    pub fn text_color_for(&self, band: SeverityBand) -> &str {
        self.text_color(self.background(band))
    }
}

impl Default for BandPalette {
    fn default() -> Self {
        Self::ncrc()
    }
}
