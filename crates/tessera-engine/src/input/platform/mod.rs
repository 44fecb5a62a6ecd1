//! Platform event translation.

mod winit;

pub use self::winit::translate_key_event;
