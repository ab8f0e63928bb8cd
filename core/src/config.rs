use crate::{
    lender::{LenderDirectory, LenderInfo},
    palette::BandPalette,
    prepare::GeographyAliases,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ── Dataset location ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub data_dir: PathBuf,
    /// Combined document with every lender's records.
    pub primary_file: String,
    /// Per-lender documents, concatenated in this order when the primary
    /// document cannot be read.
    pub fallback_files: Vec<String>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            primary_file: "all-bank-data.json".into(),
            fallback_files: vec![
                "frost-bank-data.json".into(),
                "webster-bank-data.json".into(),
            ],
        }
    }
}

impl DatasetConfig {
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self { data_dir: data_dir.as_ref().to_path_buf(), ..Self::default() }
    }

    pub fn primary_path(&self) -> PathBuf {
        self.data_dir.join(&self.primary_file)
    }

    pub fn fallback_paths(&self) -> Vec<PathBuf> {
        self.fallback_files.iter().map(|f| self.data_dir.join(f)).collect()
    }
}

// ── Dashboard configuration ──────────────────────────────────────────────────

/// Config file layout. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct DashboardConfigFile {
    dataset: Option<DatasetConfig>,
    lenders: Option<Vec<LenderInfo>>,
    palette: Option<BandPalette>,
    geography: Option<GeographyAliases>,
}

/// Immutable configuration, loaded once at start-up.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub dataset: DatasetConfig,
    pub lenders: LenderDirectory,
    pub palette: BandPalette,
    pub geography: GeographyAliases,
}

impl DashboardConfig {
    /// Load from a JSON config file. Missing sections take the built-in
    /// values.
    /// In tests, use DashboardConfig::builtin().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let file: DashboardConfigFile = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;

        let builtin = Self::builtin();
        let config = Self {
            dataset: file.dataset.unwrap_or(builtin.dataset),
            lenders: file.lenders.map(LenderDirectory::new).unwrap_or(builtin.lenders),
            palette: file.palette.unwrap_or(builtin.palette),
            geography: file.geography.unwrap_or(builtin.geography),
        };
        log::debug!(
            "config loaded from {path}: {} lenders, data dir {}",
            config.lenders.lenders().len(),
            config.dataset.data_dir.display()
        );
        Ok(config)
    }

    /// The published dashboard's settings.
    pub fn builtin() -> Self {
        Self {
            dataset: DatasetConfig::default(),
            lenders: LenderDirectory::builtin(),
            palette: BandPalette::ncrc(),
            geography: GeographyAliases::builtin(),
        }
    }

    pub fn with_data_dir(mut self, data_dir: impl AsRef<Path>) -> Self {
        self.dataset.data_dir = data_dir.as_ref().to_path_buf();
        self
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::builtin()
    }
}
