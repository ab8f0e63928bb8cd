use thiserror::Error;

#[derive(Error, Debug)]
pub enum RedlineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown record field '{name}' (expected one of: {expected})")]
    UnknownField { name: String, expected: String },

    #[error("Unknown geography level '{level}' (expected state, cbsa or county)")]
    UnknownGeoLevel { level: String },

    #[error("Unknown lender '{key}'")]
    UnknownLender { key: String },

    #[error("Dataset unavailable: {reason}")]
    DatasetUnavailable { reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type RedlineResult<T> = Result<T, RedlineError>;
