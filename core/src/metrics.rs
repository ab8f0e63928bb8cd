//! Metrics engine — summary statistics over a set of records.

use crate::{
    classify::is_underperforming,
    record::LendingRecord,
    types::LoanCount,
};
use serde::{Deserialize, Serialize};

/// Rolled-up numbers for one view. Recomputed on every call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_loans: LoanCount,
    /// Mean of the non-null ratios; `None` when no record has one.
    pub avg_ratio: Option<f64>,
    /// Mean of the non-null gaps; `None` when no record has one.
    pub avg_gap: Option<f64>,
    pub underperforming_areas: usize,
    pub total_records: usize,
}

impl SummaryStats {
    /// Average ratio with "no data" reported as 0.
    pub fn avg_ratio_or_zero(&self) -> f64 {
        self.avg_ratio.unwrap_or(0.0)
    }

    /// Average gap with "no data" reported as 0.
    pub fn avg_gap_or_zero(&self) -> f64 {
        self.avg_gap.unwrap_or(0.0)
    }
}

pub fn calculate_summary_stats(records: &[LendingRecord]) -> SummaryStats {
    SummaryStats {
        total_loans: records.iter().map(|r| r.bank_count).sum(),
        avg_ratio: mean(records.iter().filter_map(|r| r.ratio)),
        avg_gap: mean(records.iter().filter_map(|r| r.gap)),
        underperforming_areas: records.iter().filter(|r| is_underperforming(r.gap)).count(),
        total_records: records.len(),
    }
}

/// Arithmetic mean, `None` for an empty sequence.
pub fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
