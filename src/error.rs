//! Error types for language-learning.

use thiserror::Error;

/// Library-level error type for pipeline operations.
#[derive(Error, Debug)]
pub enum LearningError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Vocabulary fetch failed: {0}")]
    Vocabulary(String),

    #[error("Word cache error: {0}")]
    Cache(String),

    #[error("Story generation failed: {0}")]
    Story(String),

    #[error("Speech synthesis failed: {0}")]
    Speech(String),

    #[error("Lesson import failed: {0}")]
    Import(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Result type alias for language-learning operations.
pub type Result<T> = std::result::Result<T, LearningError>;
