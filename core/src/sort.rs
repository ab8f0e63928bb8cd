//! Table row ordering.
//!
//! Strings compare byte-wise, numbers numerically. Rows with no value in the
//! sort column always go to the bottom, whichever direction is active.

use crate::record::LendingRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    County,
    State,
    Metric,
    Year,
    Ratio,
    Gap,
    BankShare,
    PeerShare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Active column and direction of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self { column: SortColumn::County, direction: SortDirection::Asc }
    }
}

impl SortState {
    /// Header click: the active column flips direction, any other column
    /// becomes active in ascending order.
    pub fn toggle(self, column: SortColumn) -> Self {
        if self.column == column {
            Self { column, direction: self.direction.flipped() }
        } else {
            Self { column, direction: SortDirection::Asc }
        }
    }

    pub fn apply(&self, records: &[LendingRecord]) -> Vec<LendingRecord> {
        sort_records(records, self.column, self.direction)
    }
}

enum Key<'a> {
    Text(&'a str),
    Number(f64),
}

fn key(record: &LendingRecord, column: SortColumn) -> Option<Key<'_>> {
    match column {
        SortColumn::County    => Some(Key::Text(&record.county)),
        SortColumn::State     => Some(Key::Text(&record.state)),
        SortColumn::Metric    => Some(Key::Text(&record.metric)),
        SortColumn::Year      => Some(Key::Number(f64::from(record.year))),
        SortColumn::Ratio     => record.ratio.map(Key::Number),
        SortColumn::Gap       => record.gap.map(Key::Number),
        SortColumn::BankShare => record.bank_share.map(Key::Number),
        SortColumn::PeerShare => record.peer_share.map(Key::Number),
    }
}

fn compare_keys(a: &Key<'_>, b: &Key<'_>) -> Ordering {
    match (a, b) {
        (Key::Text(a), Key::Text(b)) => a.cmp(b),
        (Key::Number(a), Key::Number(b)) => a.total_cmp(b),
        // A column never mixes kinds.
        (Key::Text(_), Key::Number(_)) => Ordering::Less,
        (Key::Number(_), Key::Text(_)) => Ordering::Greater,
    }
}

/// Stable sort of a copy of `records`.
pub fn sort_records(
    records: &[LendingRecord],
    column: SortColumn,
    direction: SortDirection,
) -> Vec<LendingRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| match (key(a, column), key(b, column)) {
        (Some(ka), Some(kb)) => {
            let ord = compare_keys(&ka, &kb);
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    sorted
}
