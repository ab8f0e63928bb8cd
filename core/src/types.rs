//! Shared primitive types used across the dashboard engine.

/// A reporting year. The set of years is discovered from data.
pub type Year = i32;

/// Number of loans underlying a record.
pub type LoanCount = u64;

/// A lender key as it appears in navigation paths ("frost", "webster").
pub type LenderKey = String;
