use crate::control::EngineHandle;
use crate::input::{KeyEvent, KeyFilter, ListenerRegistry};
use crate::surface::{Color, Framebuffer, Graphics};

/// Behavior plugged into the engine.
///
/// `on_create` runs once, synchronously, while the engine is being built and
/// before any window exists. `on_update` then runs once per tick on the loop
/// thread with the duration of the previous tick in seconds (0 on the first).
/// An error from either is fatal: from `on_create` the engine is never built,
/// from `on_update` the loop thread stops ticking.
pub trait Application: Send + 'static {
    fn on_create(&mut self, _ctx: &mut CreateContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_update(&mut self, ctx: &mut UpdateContext<'_>, elapsed: f64) -> anyhow::Result<()>;
}

pub struct CreateContext<'a> {
    pub(crate) surface: &'a mut Framebuffer,
    pub(crate) listeners: &'a mut ListenerRegistry,
    pub(crate) handle: &'a EngineHandle,
}

impl CreateContext<'_> {
    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    pub fn surface(&mut self) -> &mut Framebuffer {
        self.surface
    }

    pub fn graphics(&mut self) -> Graphics<'_> {
        self.surface.graphics()
    }

    pub fn fill(&mut self, x: i32, y: i32, h: i32, w: i32, color: Color) {
        self.surface.fill(x, y, h, w, color);
    }

    pub fn handle(&self) -> &EngineHandle {
        self.handle
    }

    pub fn listeners(&mut self) -> &mut ListenerRegistry {
        self.listeners
    }

    pub fn add_key_typed_listener<F>(&mut self, filter: impl Into<KeyFilter>, callback: F)
    where
        F: FnMut(&KeyEvent, &EngineHandle) -> anyhow::Result<()> + Send + 'static,
    {
        self.listeners.add_key_typed_listener(filter, callback);
    }

    pub fn add_key_pressed_listener<F>(&mut self, filter: impl Into<KeyFilter>, callback: F)
    where
        F: FnMut(&KeyEvent, &EngineHandle) -> anyhow::Result<()> + Send + 'static,
    {
        self.listeners.add_key_pressed_listener(filter, callback);
    }

    pub fn add_key_released_listener<F>(&mut self, filter: impl Into<KeyFilter>, callback: F)
    where
        F: FnMut(&KeyEvent, &EngineHandle) -> anyhow::Result<()> + Send + 'static,
    {
        self.listeners.add_key_released_listener(filter, callback);
    }
}

pub struct UpdateContext<'a> {
    pub(crate) surface: &'a mut Framebuffer,
    pub(crate) handle: &'a EngineHandle,
}

impl UpdateContext<'_> {
    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    pub fn surface(&mut self) -> &mut Framebuffer {
        self.surface
    }

    pub fn graphics(&mut self) -> Graphics<'_> {
        self.surface.graphics()
    }

    pub fn fill(&mut self, x: i32, y: i32, h: i32, w: i32, color: Color) {
        self.surface.fill(x, y, h, w, color);
    }

    pub fn handle(&self) -> &EngineHandle {
        self.handle
    }
}
