//! View builders for the three hierarchy levels.
//!
//! Each builder narrows the records with the query engine and summarizes
//! them with the metrics engine. `base` carries the lender scope. Geography
//! is always selected through `aggregate_by_geography`, so an empty state or
//! CBSA name is a group of its own rather than "any".

use crate::{
    classify::{classify_gap, classify_ratio, SeverityBand},
    metrics::{calculate_summary_stats, SummaryStats},
    palette::BandPalette,
    query::{
        aggregate_by_geography, filter_data, unique_text, unique_years, FilterSpec, GeoKey,
        GeoLevel,
    },
    record::{LendingRecord, RecordField},
    sort::SortState,
    types::Year,
};
use serde::Serialize;

// ── State level ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateCard {
    pub state: String,
    pub stats: SummaryStats,
    pub cbsa_count: usize,
}

pub fn state_overview(records: &[LendingRecord], base: &FilterSpec) -> Vec<StateCard> {
    let scoped = filter_data(records, base);
    let cards: Vec<StateCard> = aggregate_by_geography(&scoped, GeoLevel::State)
        .into_iter()
        .map(|(key, state_rows)| StateCard {
            stats: calculate_summary_stats(&state_rows),
            cbsa_count: unique_text(&state_rows, RecordField::Cbsa).len(),
            state: key.state,
        })
        .collect();
    log::debug!("state overview: {} states from {} records", cards.len(), scoped.len());
    cards
}

// ── CBSA level ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CbsaCard {
    pub cbsa: String,
    pub record_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CbsaView {
    pub state: String,
    pub cards: Vec<CbsaCard>,
    /// Table rows for every CBSA in the state.
    pub rows: Vec<LendingRecord>,
}

pub fn cbsa_view(records: &[LendingRecord], base: &FilterSpec, state: &str) -> CbsaView {
    let rows = select_group(&filter_data(records, base), GeoKey::state(state), GeoLevel::State);
    let cards = aggregate_by_geography(&rows, GeoLevel::Cbsa)
        .into_iter()
        .map(|(key, group)| CbsaCard {
            cbsa: key.cbsa.unwrap_or_default(),
            record_count: group.len(),
        })
        .collect();
    CbsaView { state: state.to_string(), cards, rows }
}

// ── County level ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountyView {
    pub state: String,
    pub cbsa: String,
    /// Years present in the CBSA, ascending, regardless of `selected_year`.
    pub years: Vec<Year>,
    pub selected_year: Option<Year>,
    pub rows: Vec<LendingRecord>,
}

pub fn county_view(
    records: &[LendingRecord],
    base: &FilterSpec,
    state: &str,
    cbsa: &str,
    year: Option<Year>,
) -> CountyView {
    let cbsa_rows =
        select_group(&filter_data(records, base), GeoKey::cbsa(state, cbsa), GeoLevel::Cbsa);
    let years = unique_years(&cbsa_rows);
    let rows = match year {
        Some(y) => filter_data(&cbsa_rows, &FilterSpec::new().year(y)),
        None => cbsa_rows,
    };
    CountyView {
        state: state.to_string(),
        cbsa: cbsa.to_string(),
        years,
        selected_year: year,
        rows,
    }
}

// ── Geography summaries ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoSummary {
    pub key: GeoKey,
    /// `key` joined with '-', for display.
    pub label: String,
    pub stats: SummaryStats,
}

/// Summary stats per geography group at `level`, in first-seen order.
pub fn geography_summary(records: &[LendingRecord], level: GeoLevel) -> Vec<GeoSummary> {
    aggregate_by_geography(records, level)
        .into_iter()
        .map(|(key, group)| GeoSummary {
            label: key.to_string(),
            stats: calculate_summary_stats(&group),
            key,
        })
        .collect()
}

/// The records of one geography group, in input order.
fn select_group(records: &[LendingRecord], key: GeoKey, level: GeoLevel) -> Vec<LendingRecord> {
    aggregate_by_geography(records, level)
        .swap_remove(&key)
        .unwrap_or_default()
}

// ── Table rows ───────────────────────────────────────────────────────────────

/// Color-coded cell for a ratio or gap value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandCell {
    pub value: Option<f64>,
    pub band: SeverityBand,
    pub background: String,
    pub text: String,
}

impl BandCell {
    fn new(value: Option<f64>, band: SeverityBand, palette: &BandPalette) -> Self {
        Self {
            value,
            band,
            background: palette.background(band).to_string(),
            text: palette.text_color_for(band).to_string(),
        }
    }

    /// Two decimals, or "N/A" when there is no value.
    pub fn display(&self) -> String {
        match self.value {
            Some(v) => format!("{v:.2}"),
            None => "N/A".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub record: LendingRecord,
    pub ratio: BandCell,
    pub gap: BandCell,
}

pub fn classify_row(record: &LendingRecord, palette: &BandPalette) -> TableRow {
    TableRow {
        ratio: BandCell::new(record.ratio, classify_ratio(record.ratio), palette),
        gap: BandCell::new(record.gap, classify_gap(record.gap), palette),
        record: record.clone(),
    }
}

/// Sorted, classified table rows.
pub fn table_rows(
    records: &[LendingRecord],
    sort: SortState,
    palette: &BandPalette,
) -> Vec<TableRow> {
    sort.apply(records)
        .iter()
        .map(|r| classify_row(r, palette))
        .collect()
}
