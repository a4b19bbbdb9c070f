use crate::control::EngineHandle;
use crate::error::{EngineError, Result};

use super::{KeyEvent, KeyFilter, KeyPhase};

pub type KeyCallback = Box<dyn FnMut(&KeyEvent, &EngineHandle) -> anyhow::Result<()> + Send>;

struct Listener {
    filter: KeyFilter,
    callback: KeyCallback,
}

/// Append-only key listeners, one ordered list per [`KeyPhase`].
#[derive(Default)]
pub struct ListenerRegistry {
    typed: Vec<Listener>,
    pressed: Vec<Listener>,
    released: Vec<Listener>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, phase: KeyPhase, filter: impl Into<KeyFilter>, callback: F)
    where
        F: FnMut(&KeyEvent, &EngineHandle) -> anyhow::Result<()> + Send + 'static,
    {
        self.listeners_mut(phase).push(Listener {
            filter: filter.into(),
            callback: Box::new(callback),
        });
    }

    pub fn add_key_typed_listener<F>(&mut self, filter: impl Into<KeyFilter>, callback: F)
    where
        F: FnMut(&KeyEvent, &EngineHandle) -> anyhow::Result<()> + Send + 'static,
    {
        self.register(KeyPhase::Typed, filter, callback);
    }

    pub fn add_key_pressed_listener<F>(&mut self, filter: impl Into<KeyFilter>, callback: F)
    where
        F: FnMut(&KeyEvent, &EngineHandle) -> anyhow::Result<()> + Send + 'static,
    {
        self.register(KeyPhase::Pressed, filter, callback);
    }

    pub fn add_key_released_listener<F>(&mut self, filter: impl Into<KeyFilter>, callback: F)
    where
        F: FnMut(&KeyEvent, &EngineHandle) -> anyhow::Result<()> + Send + 'static,
    {
        self.register(KeyPhase::Released, filter, callback);
    }

    pub fn len(&self, phase: KeyPhase) -> usize {
        self.listeners(phase).len()
    }

    /// Runs every matching listener of `phase`, in registration order.
    ///
    /// The first failing callback aborts the dispatch and its error is returned.
    /// Returns how many callbacks ran.
    pub fn dispatch(
        &mut self,
        phase: KeyPhase,
        event: &KeyEvent,
        handle: &EngineHandle,
    ) -> Result<usize> {
        let mut invoked = 0;
        for listener in self.listeners_mut(phase) {
            if !listener.filter.matches(event) {
                continue;
            }
            (listener.callback)(event, handle)
                .map_err(|source| EngineError::Listener { phase, source })?;
            invoked += 1;
        }
        Ok(invoked)
    }

    fn listeners(&self, phase: KeyPhase) -> &Vec<Listener> {
        match phase {
            KeyPhase::Typed => &self.typed,
            KeyPhase::Pressed => &self.pressed,
            KeyPhase::Released => &self.released,
        }
    }

    fn listeners_mut(&mut self, phase: KeyPhase) -> &mut Vec<Listener> {
        match phase {
            KeyPhase::Typed => &mut self.typed,
            KeyPhase::Pressed => &mut self.pressed,
            KeyPhase::Released => &mut self.released,
        }
    }
}
