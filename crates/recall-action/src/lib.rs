//! Voice command engine for window recall.
//!
//! Parses utterances into recall commands, routes them to the label
//! registry, and drives dictation and the on-screen overlay through
//! host-supplied traits.

pub mod dictation;
pub mod dispatcher;
pub mod error;
pub mod grammar;
pub mod overlay;
pub mod pending;
pub mod terminal;
pub mod types;

pub use dictation::DictationRouter;
pub use dispatcher::Dispatcher;
pub use error::DispatchError;
pub use grammar::{CommandGrammar, Vocabulary};
pub use overlay::{OverlayLayer, OverlayPresenter, OverlaySurface, OverlayView};
pub use pending::{PendingCommand, PendingMode, PendingState};
pub use types::{Command, Outcome};
