use anyhow::Result;

use tessera_engine::core::{App, AppControl, FrameCtx, LoadCtx};
use tessera_engine::input::KeyEvent;
use tessera_engine::paint::Color;

use super::close_on_escape;

/// Window-only program: opens the window and waits for Escape.
#[derive(Debug, Default)]
pub struct WindowIntro;

impl App for WindowIntro {
    fn on_load(&mut self, ctx: &mut LoadCtx<'_, '_>) -> Result<()> {
        let size = ctx.window.inner_size();
        log::info!("window {:?} open at {}x{}", ctx.window.title(), size.width, size.height);
        Ok(())
    }

    fn on_render(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        ctx.render(Color::BLACK, |_| {})
    }

    fn on_key(&mut self, event: &KeyEvent) -> AppControl {
        close_on_escape(event)
    }
}
