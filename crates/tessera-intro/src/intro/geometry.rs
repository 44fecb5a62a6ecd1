use anyhow::Result;

use tessera_engine::core::{App, AppControl, FrameCtx, LoadCtx};
use tessera_engine::input::KeyEvent;
use tessera_engine::paint::Color;
use tessera_engine::render::{QuadScene, WgpuBackend};

use super::close_on_escape;

/// Quad program: one vertex buffer, one index buffer, one shader program,
/// one indexed draw per frame.
#[derive(Default)]
pub struct GeometryIntro {
    backend: Option<WgpuBackend>,
    scene: QuadScene<WgpuBackend>,
}

impl GeometryIntro {
    pub fn is_loaded(&self) -> bool {
        self.scene.is_loaded()
    }
}

impl App for GeometryIntro {
    fn on_load(&mut self, ctx: &mut LoadCtx<'_, '_>) -> Result<()> {
        let mut backend = ctx.backend();

        // The diagnostic is already logged; frames then only clear.
        if self.scene.load(&mut backend).is_err() {
            log::warn!("continuing without geometry");
        }

        self.backend = Some(backend);
        Ok(())
    }

    fn on_render(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let scene = &self.scene;
        ctx.render(Color::BLACK, |pass| {
            scene.render(pass);
        })
    }

    fn on_key(&mut self, event: &KeyEvent) -> AppControl {
        close_on_escape(event)
    }

    fn on_close(&mut self) {
        let Some(mut backend) = self.backend.take() else {
            return;
        };
        self.scene.release(&mut backend);
    }
}
