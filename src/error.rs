//! Error types for the typing engine.

use thiserror::Error;

/// Result type alias using EngineError.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while provisioning passages or loading settings.
///
/// Scoring and diffing never fail; these only cover the edges of the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("passage provider returned an empty passage for {language}")]
    EmptyPassage { language: String },

    #[error("passage data {file} is unusable: {reason}")]
    PassageData { file: String, reason: String },

    #[error("no passages available for {language}")]
    NoPassages { language: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] serde_json::Error),
}
