use thiserror::Error;

#[derive(Error, Debug)]
pub enum BriefingError {
    #[error("Invalid date '{value}': {reason}")]
    ParseError { value: String, reason: String },

    #[error("Cannot resolve a date against an empty set of balance sheets")]
    EmptyInput,

    #[error("Balance sheet #{index} is missing required field '{field}'")]
    StructuralError { index: usize, field: &'static str },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[cfg(feature = "remote")]
    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    #[cfg(feature = "remote")]
    #[error("Narrative generation failed: {0}")]
    NarrativeFailed(String),

    #[cfg(feature = "remote")]
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, BriefingError>;
