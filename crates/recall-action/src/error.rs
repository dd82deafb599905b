//! Error types for command dispatch.

use recall_core::error::RecallError;
use recall_registry::RegistryError;

/// Errors raised while executing a command. The dispatcher turns every one
/// of these into a flash message; none reach the host.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("{0}")]
    Host(#[from] RecallError),
    #[error("no focused window to save")]
    NoActiveWindow,
    #[error("window for \"{0}\" not found")]
    WindowMissing(String),
    #[error("nothing is waiting for input")]
    NothingPending,
    #[error("timed out waiting for a new {0} window")]
    LaunchTimeout(String),
}
