//! Severity classification of ratio and gap values.
//!
//! Bands are presentation only. Classifying a value never changes it.
//! Lower bounds are inclusive and upper bounds exclusive, except the
//! open-ended top band of each scale.

use serde::{Deserialize, Serialize};

// ── Thresholds ───────────────────────────────────────────────────────────────

/// A record whose gap is strictly below this is an underperforming area.
pub const UNDERPERFORMANCE_GAP_THRESHOLD: f64 = -5.0;

pub const RATIO_GOOD_MIN: f64    = 1.0;
pub const RATIO_WARNING_MIN: f64 = 1.5;
pub const RATIO_POOR_MIN: f64    = 2.0;
pub const RATIO_SEVERE_MIN: f64  = 3.0;

pub const GAP_MINOR_MIN: f64    = -2.0;
pub const GAP_MODERATE_MIN: f64 = -5.0;
pub const GAP_LARGE_MIN: f64    = -10.0;

// ── Bands ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Peer share divided by bank share. Lower is better.
    Ratio,
    /// Bank share minus peer share. Higher is better.
    Gap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityBand {
    NoData,

    // Ratio scale
    Excellent,
    Good,
    Warning,
    Poor,
    Severe,

    // Gap scale
    Positive,
    MinorNegative,
    ModerateNegative,
    LargeNegative,
    SevereNegative,
}

impl SeverityBand {
    pub const RATIO_BANDS: [SeverityBand; 5] = [
        SeverityBand::Excellent,
        SeverityBand::Good,
        SeverityBand::Warning,
        SeverityBand::Poor,
        SeverityBand::Severe,
    ];

    pub const GAP_BANDS: [SeverityBand; 5] = [
        SeverityBand::Positive,
        SeverityBand::MinorNegative,
        SeverityBand::ModerateNegative,
        SeverityBand::LargeNegative,
        SeverityBand::SevereNegative,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SeverityBand::NoData           => "no data",
            SeverityBand::Excellent        => "excellent",
            SeverityBand::Good             => "good",
            SeverityBand::Warning          => "warning",
            SeverityBand::Poor             => "poor",
            SeverityBand::Severe           => "severe",
            SeverityBand::Positive         => "positive",
            SeverityBand::MinorNegative    => "minor negative",
            SeverityBand::ModerateNegative => "moderate negative",
            SeverityBand::LargeNegative    => "large negative",
            SeverityBand::SevereNegative   => "severe negative",
        }
    }
}

/// Classify a value on the scale for `kind`. `None` and NaN are "no data".
pub fn classify(value: Option<f64>, kind: MetricKind) -> SeverityBand {
    match kind {
        MetricKind::Ratio => classify_ratio(value),
        MetricKind::Gap => classify_gap(value),
    }
}

pub fn classify_ratio(ratio: Option<f64>) -> SeverityBand {
    let Some(r) = ratio.filter(|r| !r.is_nan()) else {
        return SeverityBand::NoData;
    };
    if r < RATIO_GOOD_MIN {
        SeverityBand::Excellent
    } else if r < RATIO_WARNING_MIN {
        SeverityBand::Good
    } else if r < RATIO_POOR_MIN {
        SeverityBand::Warning
    } else if r < RATIO_SEVERE_MIN {
        SeverityBand::Poor
    } else {
        SeverityBand::Severe
    }
}

pub fn classify_gap(gap: Option<f64>) -> SeverityBand {
    let Some(g) = gap.filter(|g| !g.is_nan()) else {
        return SeverityBand::NoData;
    };
    if g > 0.0 {
        SeverityBand::Positive
    } else if g >= GAP_MINOR_MIN {
        SeverityBand::MinorNegative
    } else if g >= GAP_MODERATE_MIN {
        SeverityBand::ModerateNegative
    } else if g >= GAP_LARGE_MIN {
        SeverityBand::LargeNegative
    } else {
        SeverityBand::SevereNegative
    }
}

/// True when a gap counts toward `underperforming_areas`.
pub fn is_underperforming(gap: Option<f64>) -> bool {
    matches!(gap, Some(g) if g < UNDERPERFORMANCE_GAP_THRESHOLD)
}
