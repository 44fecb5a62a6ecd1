use anyhow::Result;

use crate::input::KeyEvent;
use crate::time::FrameTime;

use super::ctx::{FrameCtx, LoadCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    /// Request the window to close. Observed at the next loop iteration.
    Exit,
}

/// Lifecycle hooks driven by `window::Runtime`.
///
/// Call order: `on_load` once, then per tick `on_update` followed by
/// `on_render`, and `on_close` once when the loop shuts down. `on_key` is
/// called for every key-down in between.
pub trait App {
    /// Called once after the window and rendering context exist.
    ///
    /// An error here aborts startup and is returned from `Runtime::run`.
    fn on_load(&mut self, ctx: &mut LoadCtx<'_, '_>) -> Result<()>;

    /// Called once per tick before rendering.
    fn on_update(&mut self, time: FrameTime) -> AppControl {
        let _ = time;
        AppControl::Continue
    }

    /// Called once per tick after `on_update`.
    fn on_render(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Called for key-down events (including repeats).
    fn on_key(&mut self, event: &KeyEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once before the rendering context is dropped, or without a
    /// context if startup never got that far.
    fn on_close(&mut self) {}
}
