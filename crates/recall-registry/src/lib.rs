//! Window label registry.
//!
//! Maps spoken labels (a primary name plus any number of aliases) to saved
//! windows, enforces label uniqueness, and persists the mapping to JSON.

pub mod entry;
pub mod error;
pub mod label;
pub mod registry;
pub mod spoken;
pub mod store;

pub use entry::WindowEntry;
pub use error::RegistryError;
pub use label::{normalize_label, spoken_label};
pub use registry::{LabelRegistry, Promotion};
pub use spoken::spoken_forms;
pub use store::RegistryStore;
