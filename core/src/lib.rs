//! Filtering, aggregation and severity classification for the redlining
//! dashboard.
//!
//! Data flows one way: `store` loads records once, `query` narrows and
//! groups them, `metrics` and `classify` summarize and band them, `views`
//! composes the three hierarchy levels.

pub mod classify;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod lender;
pub mod metrics;
pub mod palette;
pub mod prepare;
pub mod query;
pub mod record;
pub mod sort;
pub mod store;
pub mod types;
pub mod views;
