//! Dataset preparation — raw subject/peer counts to lending records.
//!
//! Runs upstream of the dashboard. Shares are computed against the totals of
//! the (state, cbsa, county, year, kind, loan purpose) group; gap and ratio
//! are then derived from the shares and everything is rounded to 2 places.
//! Adverse rows (ratio above 1 or a negative gap) also get a loan shortfall
//! and, when the export carries an average loan amount, a damages estimate.

use crate::{
    lender::LenderInfo,
    record::LendingRecord,
    types::{LoanCount, Year},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BankType {
    Subject,
    Peer,
}

/// One row of a raw count export. Accepts both snake_case and the camelCase
/// column names of the warehouse export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCountRow {
    pub state: String,
    pub cbsa: String,
    pub county: String,
    pub year: Year,
    pub metric: String,
    #[serde(alias = "loanPurpose")]
    pub loan_purpose: String,
    pub kind: String,
    #[serde(alias = "bankType")]
    pub bank_type: BankType,
    #[serde(default, alias = "bankCount")]
    pub bank_count: Option<LoanCount>,
    #[serde(default, alias = "peerCount")]
    pub peer_count: Option<LoanCount>,
    #[serde(default, alias = "avgLoanAmount")]
    pub avg_loan_amount: Option<f64>,
}

// ── Geography normalization ──────────────────────────────────────────────────

/// Renames applied to rows of a single state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AliasRule {
    pub state: String,
    #[serde(default)]
    pub cbsa: BTreeMap<String, String>,
    #[serde(default)]
    pub county: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeographyAliases {
    pub rules: Vec<AliasRule>,
}

impl GeographyAliases {
    /// Connecticut replaced its counties with planning regions in 2024 and
    /// several CBSAs were renamed with them. Map both back onto one name per
    /// area so that all years line up.
    pub fn builtin() -> Self {
        let cbsa = [
            ("Bridgeport-Stamford-Norwalk, CT", "Bridgeport-Stamford-Danbury, CT"),
            ("Hartford-East Hartford-Middletown, CT", "Hartford-West Hartford-East Hartford, CT"),
            ("New Haven-Milford, CT", "New Haven, CT"),
        ];
        let county = [
            ("Greater Bridgeport Planning Region", "Fairfield County"),
            ("Capitol Planning Region", "Hartford County"),
            ("South Central Connecticut Planning Region", "New Haven County"),
            ("Southeastern Connecticut Planning Region", "New London County"),
            ("Naugatuck Valley Planning Region", "New Haven County"),
            ("Lower Connecticut River Valley Planning Region", "Middlesex County"),
            ("Northwest Hills Planning Region", "Litchfield County"),
            ("Northeastern Connecticut Planning Region", "Tolland County"),
            ("Western Connecticut Planning Region", "Fairfield County"),
        ];
        Self {
            rules: vec![AliasRule {
                state: "Connecticut".into(),
                cbsa: to_map(&cbsa),
                county: to_map(&county),
            }],
        }
    }

    /// Apply every rule whose state matches the row.
    pub fn normalize(&self, row: &mut RawCountRow) {
        for rule in self.rules.iter().filter(|r| r.state == row.state) {
            if let Some(cbsa) = rule.cbsa.get(&row.cbsa) {
                row.cbsa = cbsa.clone();
            }
            if let Some(county) = rule.county.get(&row.county) {
                row.county = county.clone();
            }
        }
    }
}

fn to_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect()
}

// ── Share computation ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupKey {
    state: String,
    cbsa: String,
    county: String,
    year: Year,
    kind: String,
    loan_purpose: String,
}

impl GroupKey {
    fn of(row: &RawCountRow) -> Self {
        Self {
            state: row.state.clone(),
            cbsa: row.cbsa.clone(),
            county: row.county.clone(),
            year: row.year,
            kind: row.kind.clone(),
            loan_purpose: row.loan_purpose.clone(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Totals {
    bank: LoanCount,
    peer: LoanCount,
}

/// Two places, ties to even.
fn round2(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}

fn share(count: LoanCount, total: LoanCount) -> Option<f64> {
    (total > 0).then(|| count as f64 / total as f64 * 100.0)
}

/// Loans the bank fell short of peer parity by, as a negative count. `None`
/// unless the row is adverse.
fn shortfall(gap: Option<f64>, ratio: Option<f64>, bank_total: LoanCount) -> Option<f64> {
    let adverse = ratio.is_some_and(|r| r > 1.0) || gap.is_some_and(|g| g < 0.0);
    if !adverse || bank_total == 0 {
        return None;
    }
    // A ratio above 1 implies peer share > bank share, so the gap is set.
    gap.map(|g| g / 100.0 * bank_total as f64)
}

fn damages(shortfall: Option<f64>, avg_loan_amount: Option<f64>) -> Option<f64> {
    Some((shortfall?.abs() * avg_loan_amount?).round_ties_even())
}

/// Build dashboard records for `lender` from a raw export. One record per
/// subject row, in input order.
pub fn prepare_records(
    raw: &[RawCountRow],
    lender: &LenderInfo,
    aliases: &GeographyAliases,
) -> Vec<LendingRecord> {
    let rows: Vec<RawCountRow> = raw
        .iter()
        .cloned()
        .map(|mut row| {
            aliases.normalize(&mut row);
            row
        })
        .collect();

    let mut totals: HashMap<GroupKey, Totals> = HashMap::new();
    // Keyed by group + metric; a later peer row replaces an earlier one.
    let mut peers: HashMap<(GroupKey, &str), &RawCountRow> = HashMap::new();
    for row in &rows {
        let entry = totals.entry(GroupKey::of(row)).or_default();
        match row.bank_type {
            BankType::Subject => entry.bank += row.bank_count.unwrap_or(0),
            BankType::Peer => {
                entry.peer += row.peer_count.unwrap_or(0);
                peers.insert((GroupKey::of(row), row.metric.as_str()), row);
            }
        }
    }

    let records: Vec<LendingRecord> = rows
        .iter()
        .filter(|r| r.bank_type == BankType::Subject)
        .map(|subject| {
            let key = GroupKey::of(subject);
            let group = totals.get(&key).copied().unwrap_or_default();
            let peer_count = peers
                .get(&(key, subject.metric.as_str()))
                .and_then(|p| p.peer_count)
                .unwrap_or(0);
            let bank_count = subject.bank_count.unwrap_or(0);

            let bank_share = share(bank_count, group.bank);
            let peer_share = share(peer_count, group.peer);
            let gap = match (bank_share, peer_share) {
                (Some(b), Some(p)) => Some(b - p),
                _ => None,
            };
            let ratio = match (bank_share, peer_share) {
                (Some(b), Some(p)) if b > 0.0 => Some(p / b),
                _ => None,
            };
            let short = shortfall(gap, ratio, group.bank);

            LendingRecord {
                bank: lender.name.clone(),
                lei: lender.lei.clone(),
                state: subject.state.clone(),
                cbsa: subject.cbsa.clone(),
                county: subject.county.clone(),
                year: subject.year,
                metric: subject.metric.clone(),
                loan_purpose: subject.loan_purpose.clone(),
                kind: subject.kind.clone(),
                bank_count,
                bank_share: bank_share.map(round2),
                peer_share: peer_share.map(round2),
                gap: gap.map(round2),
                ratio: ratio.map(round2),
                cbsa_app_percent_bucket: None,
                avg_loan_amount: subject.avg_loan_amount.map(round2),
                shortfall: short.map(round2),
                damages: damages(short, subject.avg_loan_amount),
            }
        })
        .collect();

    log::info!(
        "prepare: {} raw rows -> {} records for {}",
        raw.len(),
        records.len(),
        lender.name
    );
    records
}
