//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the single Window, creates the rendering
//! context for it and drives the `core::App` hooks.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
