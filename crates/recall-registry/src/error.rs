//! Error types for the label registry.

use recall_core::error::RecallError;

/// Errors from registry lookups and mutations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("no window saved as \"{0}\"")]
    NotFound(String),
    #[error("\"{label}\" already belongs to \"{owner}\"")]
    Ambiguous { label: String, owner: String },
    #[error("\"{0}\" is a reserved word")]
    Reserved(String),
    #[error("label must not be empty")]
    EmptyLabel,
    #[error("\"{0}\" and \"{1}\" are the same window")]
    SameEntry(String, String),
    /// Reading or writing the saved-windows file failed.
    #[error(transparent)]
    Storage(#[from] RecallError),
}
