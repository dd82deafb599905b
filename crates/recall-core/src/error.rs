use thiserror::Error;

/// Top-level error type for the recall system.
///
/// Host integrations (window system, keyboard, overlay) and the persistence
/// layer report failures through this type. Subsystem crates wrap it in their
/// own error enums so that `?` works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecallError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Window system error: {0}")]
    Window(String),

    #[error("Input error: {0}")]
    Input(String),

    #[error("Overlay error: {0}")]
    Overlay(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for RecallError {
    fn from(err: toml::de::Error) -> Self {
        RecallError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for RecallError {
    fn from(err: toml::ser::Error) -> Self {
        RecallError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for RecallError {
    fn from(err: serde_json::Error) -> Self {
        RecallError::Serialization(err.to_string())
    }
}

/// Convenience alias used throughout the recall crates.
pub type Result<T> = std::result::Result<T, RecallError>;
