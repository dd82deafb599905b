pub mod config;
pub mod desktop;
pub mod error;
pub mod host;
pub mod types;

pub use config::RecallConfig;
pub use desktop::{DesktopSnapshot, InputEvent, SimulatedDesktop};
pub use error::{RecallError, Result};
pub use host::{KeyboardInput, WindowSystem};
pub use types::*;
