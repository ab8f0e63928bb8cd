//! Record store and dataset file access.
//!
//! RULE: Only store.rs touches dataset files.
//! Everything downstream works on the in-memory, read-only `RecordStore`.

use crate::{
    config::DatasetConfig,
    error::{RedlineError, RedlineResult},
    prepare::RawCountRow,
    record::LendingRecord,
};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};

/// The immutable collection of lending records held for a session.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<LendingRecord>,
}

/// Which source a `RecordStore::load` call ended up using.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Primary,
    Fallback,
    /// Every source failed; the store is empty.
    Empty,
}

impl RecordStore {
    pub fn from_records(records: Vec<LendingRecord>) -> Self {
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Read a single dataset document. Errors are returned, never swallowed.
    pub fn open(path: impl AsRef<Path>) -> RedlineResult<Self> {
        let records = read_records(path.as_ref())?;
        Ok(Self { records })
    }

    /// Load the dataset the way the dashboard does: the primary document
    /// first, then the concatenation of the fallback documents, then empty.
    pub fn load(dataset: &DatasetConfig) -> (Self, LoadSource) {
        let primary = dataset.primary_path();
        match read_records(&primary) {
            Ok(records) => {
                log::debug!("loaded {} records from {}", records.len(), primary.display());
                return (Self { records }, LoadSource::Primary);
            }
            Err(e) => {
                log::warn!("primary dataset {} unavailable: {e}", primary.display());
            }
        }

        match read_fallback(&dataset.fallback_paths()) {
            Ok(records) => {
                log::debug!("loaded {} records from fallback documents", records.len());
                (Self { records }, LoadSource::Fallback)
            }
            Err(e) => {
                log::error!("fallback dataset unavailable: {e}");
                (Self::empty(), LoadSource::Empty)
            }
        }
    }

    pub fn records(&self) -> &[LendingRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ── Dataset documents ────────────────────────────────────────────────────────

fn read_fallback(paths: &[PathBuf]) -> RedlineResult<Vec<LendingRecord>> {
    if paths.is_empty() {
        return Err(RedlineError::DatasetUnavailable {
            reason: "no fallback documents configured".into(),
        });
    }
    let mut records = Vec::new();
    for path in paths {
        records.extend(read_records(path)?);
    }
    Ok(records)
}

fn read_records(path: &Path) -> RedlineResult<Vec<LendingRecord>> {
    read_document(path)
}

/// Read a JSON document that is either a bare array of rows or an object
/// with a `records` array (the layout the preparation step writes).
fn read_document<T: DeserializeOwned>(path: &Path) -> RedlineResult<Vec<T>> {
    let content = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;
    let rows = match value {
        serde_json::Value::Array(rows) => serde_json::Value::Array(rows),
        serde_json::Value::Object(mut map) => match map.remove("records") {
            Some(rows) => rows,
            None => {
                return Err(RedlineError::DatasetUnavailable {
                    reason: format!("{} has no `records` array", path.display()),
                })
            }
        },
        _ => {
            return Err(RedlineError::DatasetUnavailable {
                reason: format!("{} is not a JSON array or object", path.display()),
            })
        }
    };
    Ok(serde_json::from_value(rows)?)
}

// ── Preparation input/output ────────────────────────────────────────────────

/// Read a raw subject/peer count export.
pub fn read_raw_export(path: impl AsRef<Path>) -> RedlineResult<Vec<RawCountRow>> {
    read_document(path.as_ref())
}

/// Write prepared records as a bare JSON array, the layout the loader reads.
pub fn write_records(path: impl AsRef<Path>, records: &[LendingRecord]) -> RedlineResult<()> {
    write_json(path.as_ref(), records)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> RedlineResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}
