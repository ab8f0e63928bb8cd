//! The dashboard — a loaded record store plus its configuration.
//!
//! This is the handle a presentation layer holds for a session. All methods
//! take `&self`; the store never changes after `build`.

use crate::{
    config::DashboardConfig,
    error::RedlineResult,
    lender::LenderSelection,
    metrics::{calculate_summary_stats, SummaryStats},
    query::{filter_data, unique_values_by_name, FilterSpec, GeoLevel},
    record::{FieldValue, LendingRecord},
    sort::SortState,
    store::{LoadSource, RecordStore},
    types::Year,
    views::{self, CbsaView, CountyView, GeoSummary, StateCard, TableRow},
};

pub struct Dashboard {
    store:  RecordStore,
    config: DashboardConfig,
}

impl Dashboard {
    pub fn new(store: RecordStore, config: DashboardConfig) -> Self {
        Self { store, config }
    }

    /// Load the dataset named by `config` and wrap it.
    pub fn build(config: DashboardConfig) -> (Self, LoadSource) {
        let (store, source) = RecordStore::load(&config.dataset);
        log::info!("dashboard ready: {} records ({source:?})", store.len());
        (Self::new(store, config), source)
    }

    pub fn records(&self) -> &[LendingRecord] {
        self.store.records()
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// The lender filter every view of `selection` starts from.
    pub fn scope(&self, selection: &LenderSelection) -> RedlineResult<FilterSpec> {
        self.config.lenders.filter_for(selection)
    }

    pub fn state_overview(&self, selection: &LenderSelection) -> RedlineResult<Vec<StateCard>> {
        let base = self.scope(selection)?;
        Ok(views::state_overview(self.records(), &base))
    }

    pub fn cbsa_view(&self, selection: &LenderSelection, state: &str) -> RedlineResult<CbsaView> {
        let base = self.scope(selection)?;
        Ok(views::cbsa_view(self.records(), &base, state))
    }

    pub fn county_view(
        &self,
        selection: &LenderSelection,
        state: &str,
        cbsa: &str,
        year: Option<Year>,
    ) -> RedlineResult<CountyView> {
        let base = self.scope(selection)?;
        Ok(views::county_view(self.records(), &base, state, cbsa, year))
    }

    pub fn filter(&self, spec: &FilterSpec) -> Vec<LendingRecord> {
        filter_data(self.records(), spec)
    }

    pub fn summary(&self, spec: &FilterSpec) -> SummaryStats {
        calculate_summary_stats(&self.filter(spec))
    }

    pub fn unique(&self, spec: &FilterSpec, field: &str) -> RedlineResult<Vec<FieldValue>> {
        unique_values_by_name(&self.filter(spec), field)
    }

    /// Per-geography summaries of the matching records. `level` is one of
    /// "state", "cbsa" or "county".
    pub fn aggregate(&self, spec: &FilterSpec, level: &str) -> RedlineResult<Vec<GeoSummary>> {
        let level: GeoLevel = level.parse()?;
        Ok(views::geography_summary(&self.filter(spec), level))
    }

    pub fn table(&self, rows: &[LendingRecord], sort: SortState) -> Vec<TableRow> {
        views::table_rows(rows, sort, &self.config.palette)
    }
}
