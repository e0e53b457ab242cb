use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A persisted filter value could not be percent-decoded.
    #[error("Malformed encoding in {key}: {reason}")]
    Decode { key: String, reason: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("API error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, FilterError>;
