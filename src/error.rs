use thiserror::Error;

pub type Result<T> = std::result::Result<T, StormError>;

#[derive(Debug, Error)]
pub enum StormError {
    /// A damage scale code outside `H`, `K`, `M`, `B` or empty.
    #[error("unrecognized scale code '{code}'")]
    InvalidScaleCode { code: String },

    #[error("invalid taxonomy rule '{pattern}': {reason}")]
    InvalidRule { pattern: String, reason: String },

    #[error("unknown event class '{0}'")]
    UnknownEventClass(String),

    #[error("storm export is missing column '{0}'")]
    MissingColumn(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("configuration error: {0}")]
    Config(String),
}
