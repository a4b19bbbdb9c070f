//! A small windowed pixel engine.
//!
//! An [`Application`] draws into a [`Framebuffer`] once per tick on a
//! dedicated loop thread, paced to a configurable maximum rate, while the
//! window thread presents finished frames and dispatches keyboard input to
//! registered listeners.

pub mod app;
pub mod config;
pub mod context;
pub mod control;
pub mod error;
pub mod input;
pub mod runner;
pub mod surface;
pub mod timing;

pub use app::{Application, CreateContext, UpdateContext};
pub use config::EngineConfig;
pub use context::Engine;
pub use control::{EngineHandle, EngineState};
pub use error::{EngineError, Result};
pub use input::{KeyEvent, KeyFilter, KeyPhase, ListenerRegistry};
pub use runner::{EngineLoop, Presenter};
pub use surface::{Color, Framebuffer, Graphics};
pub use timing::{pacing_delay, FrameClock};

pub use winit::keyboard::KeyCode;

/// Installs `env_logger`, honoring `RUST_LOG` and falling back to `default_filter`.
///
/// Later calls are ignored.
pub fn init_logger(default_filter: &str) {
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let _ = env_logger::Builder::from_env(env).try_init();
}
