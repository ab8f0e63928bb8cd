//! Lender directory — metadata for the lenders in the dataset.

use crate::{
    error::{RedlineError, RedlineResult},
    query::FilterSpec,
    types::LenderKey,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LenderInfo {
    pub key: LenderKey,
    /// Display name; matches `LendingRecord::bank`.
    pub name: String,
    pub lei: String,
    pub headquarters: String,
    pub assets: String,
    pub branches: u32,
    pub states: Vec<String>,
}

/// Which lender a view is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LenderSelection {
    One(LenderKey),
    Both,
}

impl FromStr for LenderSelection {
    type Err = RedlineError;

    fn from_str(s: &str) -> RedlineResult<Self> {
        match s.trim() {
            "" => Err(RedlineError::UnknownLender { key: s.to_string() }),
            "both" => Ok(LenderSelection::Both),
            key => Ok(LenderSelection::One(key.to_ascii_lowercase())),
        }
    }
}

impl fmt::Display for LenderSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LenderSelection::One(key) => f.write_str(key),
            LenderSelection::Both => f.write_str("both"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LenderDirectory {
    lenders: Vec<LenderInfo>,
}

impl LenderDirectory {
    pub fn new(lenders: Vec<LenderInfo>) -> Self {
        Self { lenders }
    }

    /// The two lenders covered by the published dashboard.
    pub fn builtin() -> Self {
        Self::new(vec![
            LenderInfo {
                key: "frost".into(),
                name: "Frost Bank".into(),
                lei: "G5AHTAP80NWA3Q8RDC78".into(),
                headquarters: "San Antonio, TX".into(),
                assets: "$51.5 billion".into(),
                branches: 214,
                states: vec!["TX".into()],
            },
            LenderInfo {
                key: "webster".into(),
                name: "Webster Bank".into(),
                lei: "WV0OVGBTLUP1XIUJE722".into(),
                headquarters: "Stamford, CT".into(),
                assets: "$81.8 billion".into(),
                branches: 196,
                states: vec!["CT".into(), "MA".into(), "NY".into(), "RI".into()],
            },
        ])
    }

    pub fn lookup(&self, key: &str) -> RedlineResult<&LenderInfo> {
        self.lenders
            .iter()
            .find(|l| l.key.eq_ignore_ascii_case(key))
            .ok_or_else(|| RedlineError::UnknownLender { key: key.to_string() })
    }

    pub fn lenders(&self) -> &[LenderInfo] {
        &self.lenders
    }

    /// The filter a view applies for a lender selection. `Both` leaves the
    /// bank dimension unconstrained.
    pub fn filter_for(&self, selection: &LenderSelection) -> RedlineResult<FilterSpec> {
        match selection {
            LenderSelection::Both => Ok(FilterSpec::new()),
            LenderSelection::One(key) => {
                let lender = self.lookup(key)?;
                Ok(FilterSpec::new().bank(&lender.name))
            }
        }
    }
}

impl Default for LenderDirectory {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_parses_path_segments() {
        assert_eq!("both".parse::<LenderSelection>().unwrap(), LenderSelection::Both);
        assert_eq!(
            "Frost".parse::<LenderSelection>().unwrap(),
            LenderSelection::One("frost".into())
        );
        assert!("".parse::<LenderSelection>().is_err());
    }

    #[test]
    fn unknown_lender_is_an_error() {
        let dir = LenderDirectory::builtin();
        assert!(dir.lookup("chase").is_err());
        assert_eq!(dir.lookup("webster").unwrap().name, "Webster Bank");
    }
}
