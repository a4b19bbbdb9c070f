use std::sync::{Arc, Mutex, PoisonError};

use pixels::{Pixels, SurfaceTexture};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy},
    window::{Window, WindowId},
};

use crate::app::{Application, CreateContext};
use crate::config::EngineConfig;
use crate::control::EngineHandle;
use crate::error::{EngineError, Result};
use crate::input::{translate_winit_key, KeyEvent, KeyPhase, ListenerRegistry};
use crate::runner::{EngineLoop, Presenter};
use crate::surface::Framebuffer;

/// Messages from other threads to the window thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EngineEvent {
    Redraw,
    Shutdown,
}

/// Last published frame, read by the window thread on every repaint.
type FrontBuffer = Arc<Mutex<Framebuffer>>;

/// An engine whose `on_create` already ran, ready to be started.
pub struct Engine<A: Application> {
    config: EngineConfig,
    app: A,
    surface: Framebuffer,
    listeners: ListenerRegistry,
    handle: EngineHandle,
}

impl<A: Application> Engine<A> {
    /// Allocates the framebuffer and runs `on_create`.
    ///
    /// A failing `on_create` aborts construction with [`EngineError::Startup`].
    pub fn new(config: EngineConfig, mut app: A) -> Result<Self> {
        config.validate()?;
        let handle = EngineHandle::new(config.max_fps);
        let mut surface = Framebuffer::new(config.width, config.height);
        let mut listeners = ListenerRegistry::new();

        app.on_create(&mut CreateContext {
            surface: &mut surface,
            listeners: &mut listeners,
            handle: &handle,
        })
        .map_err(EngineError::Startup)?;

        log::info!(
            "engine created: {}x{}, max fps {}",
            config.width,
            config.height,
            config.max_fps
        );
        Ok(Self {
            config,
            app,
            surface,
            listeners,
            handle,
        })
    }

    pub fn handle(&self) -> &EngineHandle {
        &self.handle
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Starts the loop thread, opens the window and blocks until the window
    /// closes or the engine is stopped.
    ///
    /// Must be called from the main thread on platforms that require it.
    /// Returns [`EngineError::LoopDetached`] if an update was still running
    /// when the shutdown wait ran out.
    pub fn start(self) -> Result<()> {
        let Engine {
            config,
            app,
            surface,
            listeners,
            handle,
        } = self;

        let event_loop = EventLoop::<EngineEvent>::with_user_event()
            .build()
            .map_err(EngineError::EventLoop)?;
        event_loop.set_control_flow(ControlFlow::Wait);
        handle.attach_window(event_loop.create_proxy());

        let front: FrontBuffer = Arc::new(Mutex::new(surface.clone()));
        let presenter = WindowPresenter {
            front: Arc::clone(&front),
            proxy: event_loop.create_proxy(),
        };
        let engine_loop = EngineLoop::spawn(app, surface, handle.clone(), presenter)?;
        log::info!("engine started");

        let mut window_app = App {
            state: State::Init,
            config: config.clone(),
            front,
            listeners,
            handle: handle.clone(),
            failure: None,
        };
        let run_result = event_loop.run_app(&mut window_app);

        handle.stop();
        let failure = window_app.failure.take();
        drop(window_app);

        let loop_result = engine_loop.join_timeout(config.shutdown_timeout());
        log::info!("engine stopped");

        if let Some(err) = failure {
            return Err(err);
        }
        run_result.map_err(EngineError::EventLoop)?;
        loop_result
    }
}

/// Hands finished frames to the window thread.
struct WindowPresenter {
    front: FrontBuffer,
    proxy: EventLoopProxy<EngineEvent>,
}

impl Presenter for WindowPresenter {
    fn present(&mut self, frame: &Framebuffer) {
        self.front
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .copy_from(frame);
        if self.proxy.send_event(EngineEvent::Redraw).is_err() {
            log::warn!("redraw request dropped, event loop closed");
        }
    }
}

struct Surface {
    window: Arc<Window>,
    pixels: Pixels<'static>,
}

enum State {
    Ready(Surface),
    Init,
}

struct App {
    state: State,
    config: EngineConfig,
    front: FrontBuffer,
    listeners: ListenerRegistry,
    handle: EngineHandle,
    failure: Option<EngineError>,
}

impl App {
    fn create_surface(&self, event_loop: &ActiveEventLoop) -> Result<Surface> {
        let attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.width as f64,
                self.config.height as f64,
            ))
            .with_resizable(false);
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .map_err(EngineError::Window)?,
        );

        let size = window.inner_size();
        let texture = SurfaceTexture::new(size.width, size.height, Arc::clone(&window));
        let pixels = Pixels::new(self.config.width, self.config.height, texture)
            .map_err(EngineError::Surface)?;
        log::debug!("window surface ready: {}x{}", size.width, size.height);

        Ok(Surface { window, pixels })
    }

    fn draw(&mut self) -> Result<()> {
        if let State::Ready(surface) = &mut self.state {
            self.front
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .write_rgba(surface.pixels.frame_mut());
            surface.pixels.render().map_err(EngineError::Present)?;
        }
        Ok(())
    }

    fn resized(&mut self, size: PhysicalSize<u32>) {
        if let State::Ready(surface) = &mut self.state {
            if let Err(err) = surface.pixels.resize_surface(size.width, size.height) {
                log::warn!("failed to resize surface: {err}");
            }
        }
    }

    /// Dispatches each phase of a key stroke. A failing listener is reported
    /// and the remaining phases, the window and the loop carry on.
    fn dispatch_keys(&mut self, events: Vec<(KeyPhase, KeyEvent)>) {
        for (phase, key_event) in events {
            if let Err(err) = self.listeners.dispatch(phase, &key_event, &self.handle) {
                log::error!("{:#}", anyhow::Error::from(err));
            }
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: EngineError) {
        log::error!("{err}");
        if self.failure.is_none() {
            self.failure = Some(err);
        }
        self.handle.stop();
        event_loop.exit();
    }
}

impl ApplicationHandler<EngineEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.handle.is_stopped() {
            event_loop.exit();
            return;
        }
        if let State::Init = self.state {
            match self.create_surface(event_loop) {
                Ok(surface) => {
                    surface.window.request_redraw();
                    self.state = State::Ready(surface);
                }
                Err(err) => self.fail(event_loop, err),
            }
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: EngineEvent) {
        match event {
            EngineEvent::Redraw => {
                if let State::Ready(surface) = &self.state {
                    surface.window.request_redraw();
                }
            }
            EngineEvent::Shutdown => event_loop.exit(),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let result = match event {
            WindowEvent::KeyboardInput {
                event,
                is_synthetic: false,
                ..
            } => {
                self.dispatch_keys(translate_winit_key(&event));
                Ok(())
            }
            WindowEvent::Resized(size) => {
                self.resized(size);
                Ok(())
            }
            WindowEvent::RedrawRequested => self.draw(),
            WindowEvent::CloseRequested => {
                self.handle.stop();
                event_loop.exit();
                Ok(())
            }
            _ => Ok(()),
        };
        if let Err(err) = result {
            self.fail(event_loop, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::UpdateContext;
    use crate::control::EngineState;
    use crate::surface::Color;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Idle;

    impl Application for Idle {
        fn on_update(&mut self, _ctx: &mut UpdateContext<'_>, _elapsed: f64) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct Setup;

    impl Application for Setup {
        fn on_create(&mut self, ctx: &mut CreateContext<'_>) -> anyhow::Result<()> {
            ctx.fill(0, 0, 2, 2, Color::RED);
            ctx.add_key_pressed_listener('q', |_: &KeyEvent, handle: &EngineHandle| {
                handle.stop();
                Ok(())
            });
            Ok(())
        }

        fn on_update(&mut self, _ctx: &mut UpdateContext<'_>, _elapsed: f64) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct Broken;

    impl Application for Broken {
        fn on_create(&mut self, _ctx: &mut CreateContext<'_>) -> anyhow::Result<()> {
            anyhow::bail!("missing mesh")
        }

        fn on_update(&mut self, _ctx: &mut UpdateContext<'_>, _elapsed: f64) -> anyhow::Result<()> {
            unreachable!("never constructed")
        }
    }

    fn small_config() -> EngineConfig {
        EngineConfig {
            width: 8,
            height: 4,
            max_fps: 30.0,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_new_runs_on_create() {
        let mut engine = Engine::new(small_config(), Setup).unwrap();
        assert_eq!(engine.surface.pixel(1, 1), Some(Color::RED));
        assert_eq!(engine.surface.pixel(2, 2), Some(Color::BLACK));
        assert_eq!(engine.listeners.len(KeyPhase::Pressed), 1);
        assert_eq!(engine.handle().state(), EngineState::Created);
        assert_eq!(engine.handle().max_fps(), 30.0);

        let handle = engine.handle.clone();
        engine
            .listeners
            .dispatch(KeyPhase::Pressed, &KeyEvent::char('q'), &handle)
            .unwrap();
        assert_eq!(handle.state(), EngineState::Stopped);
    }

    #[test]
    fn test_startup_failure_keeps_cause() {
        let err = match Engine::new(small_config(), Broken) {
            Ok(_) => panic!("engine should not be constructed"),
            Err(err) => err,
        };
        assert!(matches!(err, EngineError::Startup(_)));
        let chain = format!("{:#}", anyhow::Error::from(err));
        assert!(chain.contains("error occurred when starting the engine"), "{chain}");
        assert!(chain.contains("missing mesh"), "{chain}");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig {
            height: 0,
            ..small_config()
        };
        assert!(matches!(
            Engine::new(config, Idle),
            Err(EngineError::ConfigInvalid(_))
        ));
    }

    #[test]
    fn test_failing_listener_keeps_engine_running() {
        let config = small_config();
        let handle = EngineHandle::new(config.max_fps);
        handle.mark_started();
        let typed = Arc::new(AtomicUsize::new(0));

        let mut listeners = ListenerRegistry::new();
        listeners.add_key_pressed_listener('x', |_: &KeyEvent, _: &EngineHandle| {
            anyhow::bail!("listener broke")
        });
        {
            let typed = Arc::clone(&typed);
            listeners.add_key_typed_listener('x', move |_: &KeyEvent, _: &EngineHandle| {
                typed.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }

        let mut app = App {
            state: State::Init,
            front: Arc::new(Mutex::new(Framebuffer::new(config.width, config.height))),
            config,
            listeners,
            handle: handle.clone(),
            failure: None,
        };
        let x = KeyEvent::char('x');
        app.dispatch_keys(vec![(KeyPhase::Pressed, x), (KeyPhase::Typed, x)]);
        app.dispatch_keys(vec![(KeyPhase::Pressed, x), (KeyPhase::Typed, x)]);

        assert_eq!(typed.load(Ordering::SeqCst), 2);
        assert!(app.failure.is_none());
        assert_eq!(handle.state(), EngineState::Running);
    }
}
