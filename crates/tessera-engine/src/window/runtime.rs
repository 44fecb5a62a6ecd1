use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx, LoadCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::platform::translate_key_event;
use crate::input::{KeyEvent, KeyState};
use crate::lifecycle::{Lifecycle, Stage};
use crate::time::FrameClock;

/// Window configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "Tessera - Introduction".to_string(),
            initial_size: LogicalSize::new(800.0, 600.0),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window, drives `app` until a close request, then returns.
    ///
    /// Window or rendering-context creation failures, and an `on_load`
    /// error, are returned after `on_close` ran.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = RuntimeState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.startup_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct RuntimeState<A>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    entry: Option<WindowEntry>,
    lifecycle: Lifecycle,
    startup_error: Option<anyhow::Error>,
}

impl<A> RuntimeState<A>
where
    A: App + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            entry: None,
            lifecycle: Lifecycle::new(),
            startup_error: None,
        }
    }

    /// Creates the window and rendering context, then runs `on_load`.
    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();

        let mut entry = WindowEntryTryBuilder {
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("failed to create rendering context")?;

        let app = &mut self.app;
        let loaded = entry.with(|fields| {
            let mut ctx = LoadCtx {
                window: WindowCtx {
                    id: fields.window.id(),
                    window: fields.window,
                },
                gpu: fields.gpu,
            };
            app.on_load(&mut ctx)
        });

        // Load time must not show up as the first frame's dt.
        entry.with_clock_mut(|clock| clock.reset());
        entry.with_window(|w| w.request_redraw());

        // Stored before checking `loaded` so on_close still sees a live context.
        self.entry = Some(entry);
        loaded.context("application load failed")?;

        self.lifecycle.mark_loaded();
        log::info!("loaded; entering frame loop");
        Ok(())
    }

    /// Runs one update + render tick.
    fn tick(&mut self) {
        if !self.lifecycle.begin_frame() {
            return;
        }

        let (app, lifecycle) = (&mut self.app, &mut self.lifecycle);
        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        let control = entry.with_mut(|fields| {
            let time = fields.clock.tick();

            if app.on_update(time) == AppControl::Exit {
                return AppControl::Exit;
            }

            let mut ctx = FrameCtx {
                window: WindowCtx {
                    id: fields.window.id(),
                    window: fields.window,
                },
                gpu: fields.gpu,
                time,
            };
            app.on_render(&mut ctx)
        });

        if control == AppControl::Exit && lifecycle.request_close() {
            log::debug!("close requested by app");
        }
    }

    /// Calls `on_close` and drops the rendering context, once.
    fn release(&mut self) {
        if !self.lifecycle.close() {
            return;
        }

        log::info!("closing");
        self.app.on_close();

        // Drops the Gpu before the Window it borrows.
        self.entry = None;
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.release();
        event_loop.exit();
    }
}

/// Forwards a key-down to the app and records a close request on `Exit`.
///
/// Returns true when this event produced the (single) close request.
pub(crate) fn route_key<A: App>(app: &mut A, lifecycle: &mut Lifecycle, event: &KeyEvent) -> bool {
    if event.state != KeyState::Pressed {
        return false;
    }

    app.on_key(event) == AppControl::Exit && lifecycle.request_close()
}

impl<A> ApplicationHandler for RuntimeState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.lifecycle.stage() != Stage::Uninitialized {
            return;
        }

        if let Err(e) = self.start(event_loop) {
            log::error!("startup failed: {e:#}");
            self.startup_error = Some(e);
            self.shutdown(event_loop);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // Iteration boundary: close requests take effect here.
        if self.lifecycle.close_requested() {
            self.shutdown(event_loop);
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw: one tick per loop iteration.
        if let Some(entry) = self.entry.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                if self.lifecycle.request_close() {
                    log::debug!("close requested by window");
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let key_event = translate_key_event(&event);
                if route_key(&mut self.app, &mut self.lifecycle, &key_event) {
                    log::debug!("close requested by key {}", key_event.key);
                }
            }

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = self.entry.as_mut() {
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.entry.as_mut() {
                    let new_size = entry.with_window(|w| w.inner_size());
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                }
            }

            WindowEvent::RedrawRequested => self.tick(),

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Key;

    #[derive(Default)]
    struct EscapeApp {
        keys_seen: u32,
    }

    impl App for EscapeApp {
        fn on_load(&mut self, _ctx: &mut LoadCtx<'_, '_>) -> Result<()> {
            Ok(())
        }

        fn on_render(&mut self, _ctx: &mut FrameCtx<'_, '_>) -> AppControl {
            AppControl::Continue
        }

        fn on_key(&mut self, event: &KeyEvent) -> AppControl {
            self.keys_seen += 1;
            if event.is_down(Key::Escape) {
                AppControl::Exit
            } else {
                AppControl::Continue
            }
        }
    }

    fn loaded() -> Lifecycle {
        let mut lc = Lifecycle::new();
        lc.mark_loaded();
        lc
    }

    #[test]
    fn escape_down_requests_close_once() {
        let mut app = EscapeApp::default();
        let mut lc = loaded();

        assert!(route_key(&mut app, &mut lc, &KeyEvent::pressed(Key::Escape)));
        assert_eq!(lc.close_requests(), 1);

        // Repeat before the loop observes the request.
        assert!(!route_key(&mut app, &mut lc, &KeyEvent::pressed(Key::Escape)));
        assert_eq!(lc.close_requests(), 1);
    }

    #[test]
    fn other_keys_do_not_request_close() {
        let mut app = EscapeApp::default();
        let mut lc = loaded();

        for key in [Key::Enter, Key::Space, Key::ArrowUp, Key::Unknown(17)] {
            assert!(!route_key(&mut app, &mut lc, &KeyEvent::pressed(key)));
        }
        assert_eq!(app.keys_seen, 4);
        assert_eq!(lc.close_requests(), 0);
    }

    #[test]
    fn key_up_is_not_forwarded() {
        let mut app = EscapeApp::default();
        let mut lc = loaded();

        assert!(!route_key(&mut app, &mut lc, &KeyEvent::released(Key::Escape)));
        assert_eq!(app.keys_seen, 0);
        assert_eq!(lc.close_requests(), 0);
    }

    #[test]
    fn default_window_is_800_by_600() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.initial_size, LogicalSize::new(800.0, 600.0));
        assert!(!cfg.title.is_empty());
    }
}
