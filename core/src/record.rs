//! The lending record — one row of the dataset.
//!
//! A record is a single (bank, geography, year, metric, loan purpose, kind)
//! observation. Optional numeric fields stay `None` when the upstream export
//! had no value; nothing in the engine ever coerces them to zero.

use crate::{
    error::{RedlineError, RedlineResult},
    types::{LoanCount, Year},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LendingRecord {
    pub bank: String,
    pub lei: String,
    pub state: String,
    pub cbsa: String,
    pub county: String,
    pub year: Year,
    pub metric: String,
    pub loan_purpose: String,
    pub kind: String,
    pub bank_count: LoanCount,
    pub bank_share: Option<f64>,
    pub peer_share: Option<f64>,
    /// Bank share minus peer share, in percentage points.
    pub gap: Option<f64>,
    /// Peer share divided by bank share.
    pub ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cbsa_app_percent_bucket: Option<String>,
    /// Average subject loan amount, carried through preparation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_loan_amount: Option<f64>,
    /// Loans short of peer parity, negative when adverse.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortfall: Option<f64>,
    /// `|shortfall| * avg_loan_amount`, whole currency units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damages: Option<f64>,
}

// ── Field selection ──────────────────────────────────────────────────────────

/// Typed selector for a single record column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    Bank,
    Lei,
    State,
    Cbsa,
    County,
    Year,
    Metric,
    LoanPurpose,
    Kind,
    BankCount,
    BankShare,
    PeerShare,
    Gap,
    Ratio,
    CbsaAppPercentBucket,
}

impl RecordField {
    pub const ALL: [RecordField; 15] = [
        RecordField::Bank,
        RecordField::Lei,
        RecordField::State,
        RecordField::Cbsa,
        RecordField::County,
        RecordField::Year,
        RecordField::Metric,
        RecordField::LoanPurpose,
        RecordField::Kind,
        RecordField::BankCount,
        RecordField::BankShare,
        RecordField::PeerShare,
        RecordField::Gap,
        RecordField::Ratio,
        RecordField::CbsaAppPercentBucket,
    ];

    /// The serialized column name.
    pub fn name(self) -> &'static str {
        match self {
            RecordField::Bank                 => "bank",
            RecordField::Lei                  => "lei",
            RecordField::State                => "state",
            RecordField::Cbsa                 => "cbsa",
            RecordField::County               => "county",
            RecordField::Year                 => "year",
            RecordField::Metric               => "metric",
            RecordField::LoanPurpose          => "loan_purpose",
            RecordField::Kind                 => "kind",
            RecordField::BankCount            => "bank_count",
            RecordField::BankShare            => "bank_share",
            RecordField::PeerShare            => "peer_share",
            RecordField::Gap                  => "gap",
            RecordField::Ratio                => "ratio",
            RecordField::CbsaAppPercentBucket => "cbsa_app_percent_bucket",
        }
    }

    /// Project a record onto this column. `None` means the record has no
    /// value for it.
    pub fn extract(self, record: &LendingRecord) -> Option<FieldValue> {
        match self {
            RecordField::Bank        => Some(FieldValue::Text(record.bank.clone())),
            RecordField::Lei         => Some(FieldValue::Text(record.lei.clone())),
            RecordField::State       => Some(FieldValue::Text(record.state.clone())),
            RecordField::Cbsa        => Some(FieldValue::Text(record.cbsa.clone())),
            RecordField::County      => Some(FieldValue::Text(record.county.clone())),
            RecordField::Year        => Some(FieldValue::Integer(i64::from(record.year))),
            RecordField::Metric      => Some(FieldValue::Text(record.metric.clone())),
            RecordField::LoanPurpose => Some(FieldValue::Text(record.loan_purpose.clone())),
            RecordField::Kind        => Some(FieldValue::Text(record.kind.clone())),
            RecordField::BankCount   => i64::try_from(record.bank_count).ok().map(FieldValue::Integer),
            RecordField::BankShare   => record.bank_share.map(FieldValue::Number),
            RecordField::PeerShare   => record.peer_share.map(FieldValue::Number),
            RecordField::Gap         => record.gap.map(FieldValue::Number),
            RecordField::Ratio       => record.ratio.map(FieldValue::Number),
            RecordField::CbsaAppPercentBucket => {
                record.cbsa_app_percent_bucket.clone().map(FieldValue::Text)
            }
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RecordField {
    type Err = RedlineError;

    fn from_str(s: &str) -> RedlineResult<Self> {
        RecordField::ALL
            .iter()
            .copied()
            .find(|field| field.name() == s)
            .ok_or_else(|| RedlineError::UnknownField {
                name: s.to_string(),
                expected: RecordField::ALL
                    .iter()
                    .map(|f| f.name())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// A single projected column value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Number(f64),
}

impl FieldValue {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Integer(n) => write!(f, "{n}"),
            FieldValue::Number(x) => write!(f, "{x}"),
        }
    }
}
