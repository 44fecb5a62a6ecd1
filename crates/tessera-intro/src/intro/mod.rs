//! The two introduction programs.

mod geometry;
mod window;

use tessera_engine::core::AppControl;
use tessera_engine::input::{Key, KeyEvent};

pub use geometry::GeometryIntro;
pub use window::WindowIntro;

/// Escape closes the window; every other key is ignored.
fn close_on_escape(event: &KeyEvent) -> AppControl {
    if event.is_down(Key::Escape) {
        AppControl::Exit
    } else {
        AppControl::Continue
    }
}
