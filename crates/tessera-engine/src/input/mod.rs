//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! The runtime translates keyboard events through `platform` and forwards
//! key-down events to the application.

mod types;
pub(crate) mod platform;

pub use types::{Key, KeyEvent, KeyState};
