//! Query engine — filtering, distinct values and geographic grouping.
//!
//! Every function here is pure: inputs are borrowed, results are freshly
//! allocated, and nothing can fail except selecting a field by an unknown
//! name.

use crate::{
    error::{RedlineError, RedlineResult},
    record::{FieldValue, LendingRecord, RecordField},
    types::Year,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

// ── Filter specification ─────────────────────────────────────────────────────

/// Year constraint: a single year or a set of allowed years.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum YearFilter {
    Exactly(Year),
    AnyOf(Vec<Year>),
}

impl YearFilter {
    pub fn matches(&self, year: Year) -> bool {
        match self {
            YearFilter::Exactly(y) => *y == year,
            YearFilter::AnyOf(years) => years.contains(&year),
        }
    }
}

/// One predicate over a single record dimension.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    Bank(String),
    State(String),
    Cbsa(String),
    County(String),
    Year(YearFilter),
    /// The record's metric must be one of these.
    Metrics(Vec<String>),
    LoanPurpose(String),
    Kind(String),
}

impl Criterion {
    pub fn matches(&self, record: &LendingRecord) -> bool {
        match self {
            Criterion::Bank(bank)       => record.bank == *bank,
            Criterion::State(state)     => record.state == *state,
            Criterion::Cbsa(cbsa)       => record.cbsa == *cbsa,
            Criterion::County(county)   => record.county == *county,
            Criterion::Year(years)      => years.matches(record.year),
            Criterion::Metrics(metrics) => metrics.iter().any(|m| *m == record.metric),
            Criterion::LoanPurpose(lp)  => record.loan_purpose == *lp,
            Criterion::Kind(kind)       => record.kind == *kind,
        }
    }

    /// An empty string or an empty metric list places no constraint, the
    /// same as leaving the criterion out. An empty year list is NOT vacuous:
    /// it admits no year.
    fn is_vacuous(&self) -> bool {
        match self {
            Criterion::Bank(s)
            | Criterion::State(s)
            | Criterion::Cbsa(s)
            | Criterion::County(s)
            | Criterion::LoanPurpose(s)
            | Criterion::Kind(s) => s.is_empty(),
            Criterion::Metrics(m) => m.is_empty(),
            Criterion::Year(_) => false,
        }
    }
}

/// A conjunction of criteria. An empty spec matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    criteria: Vec<Criterion>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a criterion. Setting the same dimension twice keeps both, so the
    /// record has to satisfy each of them.
    pub fn with(mut self, criterion: Criterion) -> Self {
        if !criterion.is_vacuous() {
            self.criteria.push(criterion);
        }
        self
    }

    pub fn bank(self, bank: impl Into<String>) -> Self {
        self.with(Criterion::Bank(bank.into()))
    }

    pub fn state(self, state: impl Into<String>) -> Self {
        self.with(Criterion::State(state.into()))
    }

    pub fn cbsa(self, cbsa: impl Into<String>) -> Self {
        self.with(Criterion::Cbsa(cbsa.into()))
    }

    pub fn county(self, county: impl Into<String>) -> Self {
        self.with(Criterion::County(county.into()))
    }

    pub fn year(self, year: Year) -> Self {
        self.with(Criterion::Year(YearFilter::Exactly(year)))
    }

    pub fn years(self, years: impl IntoIterator<Item = Year>) -> Self {
        self.with(Criterion::Year(YearFilter::AnyOf(years.into_iter().collect())))
    }

    pub fn metrics<S: Into<String>>(self, metrics: impl IntoIterator<Item = S>) -> Self {
        self.with(Criterion::Metrics(metrics.into_iter().map(Into::into).collect()))
    }

    pub fn loan_purpose(self, loan_purpose: impl Into<String>) -> Self {
        self.with(Criterion::LoanPurpose(loan_purpose.into()))
    }

    pub fn kind(self, kind: impl Into<String>) -> Self {
        self.with(Criterion::Kind(kind.into()))
    }

    /// The conjunction of two specs.
    pub fn and(&self, other: &FilterSpec) -> FilterSpec {
        let mut criteria = self.criteria.clone();
        criteria.extend(other.criteria.iter().cloned());
        FilterSpec { criteria }
    }

    pub fn matches(&self, record: &LendingRecord) -> bool {
        self.criteria.iter().all(|c| c.matches(record))
    }
}

/// The wire shape of a filter: every dimension optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterOptions {
    pub bank: Option<String>,
    pub state: Option<String>,
    pub cbsa: Option<String>,
    pub county: Option<String>,
    pub year: Option<YearFilter>,
    pub metrics: Option<Vec<String>>,
    pub loan_purpose: Option<String>,
    pub kind: Option<String>,
}

impl From<FilterOptions> for FilterSpec {
    fn from(opts: FilterOptions) -> Self {
        let mut spec = FilterSpec::new();
        if let Some(bank) = opts.bank {
            spec = spec.bank(bank);
        }
        if let Some(state) = opts.state {
            spec = spec.state(state);
        }
        if let Some(cbsa) = opts.cbsa {
            spec = spec.cbsa(cbsa);
        }
        if let Some(county) = opts.county {
            spec = spec.county(county);
        }
        if let Some(year) = opts.year {
            spec = spec.with(Criterion::Year(year));
        }
        if let Some(metrics) = opts.metrics {
            spec = spec.metrics(metrics);
        }
        if let Some(lp) = opts.loan_purpose {
            spec = spec.loan_purpose(lp);
        }
        if let Some(kind) = opts.kind {
            spec = spec.kind(kind);
        }
        spec
    }
}

/// Records satisfying every criterion of `spec`, in input order.
pub fn filter_data(records: &[LendingRecord], spec: &FilterSpec) -> Vec<LendingRecord> {
    records.iter().filter(|r| spec.matches(r)).cloned().collect()
}

// ── Distinct values ──────────────────────────────────────────────────────────

#[derive(PartialEq, Eq, Hash)]
enum DedupKey {
    Text(String),
    Integer(i64),
    Number(u64),
}

impl DedupKey {
    fn of(value: &FieldValue) -> Self {
        match value {
            FieldValue::Text(s) => DedupKey::Text(s.clone()),
            FieldValue::Integer(n) => DedupKey::Integer(*n),
            // -0.0 and 0.0 are the same value; all NaNs collapse to one.
            FieldValue::Number(x) if *x == 0.0 => DedupKey::Number(0),
            FieldValue::Number(x) if x.is_nan() => DedupKey::Number(f64::NAN.to_bits()),
            FieldValue::Number(x) => DedupKey::Number(x.to_bits()),
        }
    }
}

/// Distinct non-null values of `field`, in first-occurrence order.
/// Callers that display these sort them themselves.
pub fn unique_values(records: &[LendingRecord], field: RecordField) -> Vec<FieldValue> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter_map(|r| field.extract(r))
        .filter(|v| seen.insert(DedupKey::of(v)))
        .collect()
}

/// `unique_values` with the field chosen by column name.
pub fn unique_values_by_name(
    records: &[LendingRecord],
    field: &str,
) -> RedlineResult<Vec<FieldValue>> {
    let field: RecordField = field.parse()?;
    Ok(unique_values(records, field))
}

/// Distinct values of a text column.
pub fn unique_text(records: &[LendingRecord], field: RecordField) -> Vec<String> {
    unique_values(records, field)
        .into_iter()
        .filter_map(|v| match v {
            FieldValue::Text(s) => Some(s),
            _ => None,
        })
        .collect()
}

/// Distinct years, ascending.
pub fn unique_years(records: &[LendingRecord]) -> Vec<Year> {
    let mut years: Vec<Year> = unique_values(records, RecordField::Year)
        .into_iter()
        .filter_map(|v| v.as_integer().and_then(|y| Year::try_from(y).ok()))
        .collect();
    years.sort_unstable();
    years
}

// ── Geographic grouping ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoLevel {
    State,
    Cbsa,
    County,
}

impl FromStr for GeoLevel {
    type Err = RedlineError;

    fn from_str(s: &str) -> RedlineResult<Self> {
        match s {
            "state" => Ok(GeoLevel::State),
            "cbsa" => Ok(GeoLevel::Cbsa),
            "county" => Ok(GeoLevel::County),
            other => Err(RedlineError::UnknownGeoLevel { level: other.to_string() }),
        }
    }
}

/// Composite geography key, always anchored at the state so that a CBSA or
/// county name repeated across states stays distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GeoKey {
    pub state: String,
    pub cbsa: Option<String>,
    pub county: Option<String>,
}

impl GeoKey {
    pub fn state(state: impl Into<String>) -> Self {
        Self { state: state.into(), cbsa: None, county: None }
    }

    pub fn cbsa(state: impl Into<String>, cbsa: impl Into<String>) -> Self {
        Self { state: state.into(), cbsa: Some(cbsa.into()), county: None }
    }

    pub fn of(record: &LendingRecord, level: GeoLevel) -> Self {
        let (cbsa, county) = match level {
            GeoLevel::State => (None, None),
            GeoLevel::Cbsa => (Some(record.cbsa.clone()), None),
            GeoLevel::County => (Some(record.cbsa.clone()), Some(record.county.clone())),
        };
        Self { state: record.state.clone(), cbsa, county }
    }
}

impl fmt::Display for GeoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.state)?;
        if let Some(cbsa) = &self.cbsa {
            write!(f, "-{cbsa}")?;
        }
        if let Some(county) = &self.county {
            write!(f, "-{county}")?;
        }
        Ok(())
    }
}

/// Group records by geography at `level`. Groups appear in first-seen
/// order; records keep their input order within a group.
pub fn aggregate_by_geography(
    records: &[LendingRecord],
    level: GeoLevel,
) -> IndexMap<GeoKey, Vec<LendingRecord>> {
    let mut grouped: IndexMap<GeoKey, Vec<LendingRecord>> = IndexMap::new();
    for record in records {
        grouped
            .entry(GeoKey::of(record, level))
            .or_default()
            .push(record.clone());
    }
    grouped
}
