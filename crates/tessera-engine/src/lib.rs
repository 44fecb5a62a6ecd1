//! Tessera engine crate.
//!
//! Window shell, rendering context and the fixed-quad renderer used by the
//! introduction programs.

pub mod core;
pub mod device;
pub mod input;
pub mod lifecycle;
pub mod logging;
pub mod paint;
pub mod render;
pub mod time;
pub mod window;
