use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use winit::event_loop::EventLoopProxy;

use crate::context::EngineEvent;

/// Lifecycle of an engine, as seen from any thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Created,
    Running,
    Paused,
    Stopped,
}

struct Shared {
    started: AtomicBool,
    paused: AtomicBool,
    stopped: AtomicBool,
    max_fps: AtomicU64,
    // Flag writes that the loop thread may be waiting on happen under this lock.
    gate: Mutex<()>,
    wake: Condvar,
    window: Mutex<Option<EventLoopProxy<EngineEvent>>>,
}

/// Cloneable, thread-safe control surface of a running engine.
///
/// Listener callbacks receive one of these, so key bindings can pause,
/// resume, retune or stop the engine from the window thread.
#[derive(Clone)]
pub struct EngineHandle {
    shared: Arc<Shared>,
}

impl EngineHandle {
    pub fn new(max_fps: f64) -> Self {
        Self {
            shared: Arc::new(Shared {
                started: AtomicBool::new(false),
                paused: AtomicBool::new(false),
                stopped: AtomicBool::new(false),
                max_fps: AtomicU64::new(max_fps.to_bits()),
                gate: Mutex::new(()),
                wake: Condvar::new(),
                window: Mutex::new(None),
            }),
        }
    }

    pub fn state(&self) -> EngineState {
        if self.is_stopped() {
            EngineState::Stopped
        } else if !self.shared.started.load(Ordering::Acquire) {
            EngineState::Created
        } else if self.is_paused() {
            EngineState::Paused
        } else {
            EngineState::Running
        }
    }

    pub fn max_fps(&self) -> f64 {
        f64::from_bits(self.shared.max_fps.load(Ordering::Relaxed))
    }

    /// Caps the tick rate. Zero or negative removes the cap.
    pub fn set_max_fps(&self, rate: f64) {
        self.shared.max_fps.store(rate.to_bits(), Ordering::Relaxed);
        log::debug!("max fps set to {rate}");
    }

    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::Acquire)
    }

    pub fn pause(&self) {
        let _gate = self.gate();
        if !self.shared.paused.swap(true, Ordering::AcqRel) {
            log::info!("engine paused");
        }
    }

    pub fn unpause(&self) {
        let _gate = self.gate();
        if self.shared.paused.swap(false, Ordering::AcqRel) {
            log::info!("engine unpaused");
        }
        self.shared.wake.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.stopped.load(Ordering::Acquire)
    }

    /// Stops ticking at the next tick boundary and closes the window.
    ///
    /// Terminal and idempotent: later calls do nothing.
    pub fn stop(&self) {
        {
            let _gate = self.gate();
            if self.shared.stopped.swap(true, Ordering::AcqRel) {
                return;
            }
            self.shared.wake.notify_all();
        }
        log::info!("engine stopping");

        let window = self
            .shared
            .window
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(proxy) = window.as_ref() {
            if proxy.send_event(EngineEvent::Shutdown).is_err() {
                log::debug!("event loop already closed");
            }
        }
    }

    pub(crate) fn mark_started(&self) {
        self.shared.started.store(true, Ordering::Release);
    }

    pub(crate) fn attach_window(&self, proxy: EventLoopProxy<EngineEvent>) {
        *self
            .shared
            .window
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(proxy);
    }

    /// Parks the calling thread while paused. Returns `false` once stopped.
    pub(crate) fn wait_while_paused(&self) -> bool {
        let mut gate = self.gate();
        while self.is_paused() && !self.is_stopped() {
            gate = self
                .shared
                .wake
                .wait(gate)
                .unwrap_or_else(PoisonError::into_inner);
        }
        !self.is_stopped()
    }

    /// Sleeps for `duration` unless stopped first. Returns `false` if stopped.
    ///
    /// A duration past the range of [`Instant`] waits until stopped.
    pub(crate) fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now().checked_add(duration);
        let mut gate = self.gate();
        loop {
            if self.is_stopped() {
                return false;
            }
            let Some(deadline) = deadline else {
                gate = self
                    .shared
                    .wake
                    .wait(gate)
                    .unwrap_or_else(PoisonError::into_inner);
                continue;
            };
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            gate = self
                .shared
                .wake
                .wait_timeout(gate, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    fn gate(&self) -> MutexGuard<'_, ()> {
        self.shared
            .gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for EngineHandle {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle")
            .field("state", &self.state())
            .field("max_fps", &self.max_fps())
            .finish()
    }
}
