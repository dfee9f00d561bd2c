//! Unified Error Model
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TmfiError {
    #[error("SPEC/{0}")]
    SpecError(String),

    #[error("STAGE/{0}")]
    StageError(String),

    #[error("SERIALIZE/{0}")]
    SerializeError(String),

    #[error("CONFIG/{0}")]
    ConfigError(String),
}

impl From<serde_json::Error> for TmfiError {
    fn from(e: serde_json::Error) -> Self {
        TmfiError::SerializeError(e.to_string())
    }
}
