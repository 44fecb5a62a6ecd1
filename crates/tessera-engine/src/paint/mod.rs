//! Color values used for clearing frames.

mod color;

pub use color::Color;
