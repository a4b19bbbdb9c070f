use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::app::{Application, UpdateContext};
use crate::control::EngineHandle;
use crate::error::{EngineError, Result};
use crate::surface::Framebuffer;
use crate::timing::FrameClock;

const JOIN_POLL: Duration = Duration::from_millis(5);

/// Receives each finished frame from the loop thread.
pub trait Presenter: Send + 'static {
    /// Publishes `frame` and asks for it to be shown.
    fn present(&mut self, frame: &Framebuffer);
}

/// The dedicated thread driving `on_update`, presentation and pacing.
pub struct EngineLoop {
    thread: JoinHandle<Result<()>>,
}

impl EngineLoop {
    pub fn spawn<A, P>(
        mut app: A,
        mut surface: Framebuffer,
        handle: EngineHandle,
        mut presenter: P,
    ) -> Result<Self>
    where
        A: Application,
        P: Presenter,
    {
        handle.mark_started();
        let thread = thread::Builder::new()
            .name("engine-loop".to_string())
            .spawn(move || run(&mut app, &mut surface, &handle, &mut presenter))
            .map_err(EngineError::Spawn)?;
        Ok(Self { thread })
    }

    /// Waits up to `timeout` for the thread to end and returns its result.
    ///
    /// If the thread is still busy it is left detached and
    /// [`EngineError::LoopDetached`] is returned.
    pub fn join_timeout(self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while !self.thread.is_finished() {
            if Instant::now() >= deadline {
                log::warn!("engine loop did not finish within {timeout:?}, detaching");
                return Err(EngineError::LoopDetached(timeout));
            }
            thread::sleep(JOIN_POLL);
        }
        self.thread.join().unwrap_or(Err(EngineError::LoopPanicked))
    }
}

fn run<A: Application, P: Presenter>(
    app: &mut A,
    surface: &mut Framebuffer,
    handle: &EngineHandle,
    presenter: &mut P,
) -> Result<()> {
    log::info!("engine loop started");
    let clock = FrameClock::new(handle.clone());
    let mut elapsed = 0.0;

    while handle.wait_while_paused() {
        let tick_start = Instant::now();
        let mut ctx = UpdateContext {
            surface: &mut *surface,
            handle,
        };
        if let Err(err) = app.on_update(&mut ctx, elapsed) {
            log::error!("update failed, engine loop halted: {err:#}");
            return Err(EngineError::Tick(err));
        }
        presenter.present(surface);

        elapsed = clock.pace(tick_start).as_secs_f64();
        log::trace!("tick took {elapsed:.4}s");
    }

    log::info!("engine loop finished");
    Ok(())
}
