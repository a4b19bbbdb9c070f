use std::path::PathBuf;

use thiserror::Error;

use crate::input::KeyPhase;

#[derive(Debug, Error)]
pub enum EngineError {
    /// `on_create` failed; the engine was never constructed.
    #[error("error occurred when starting the engine")]
    Startup(#[source] anyhow::Error),

    /// `on_update` failed; the loop thread stopped ticking.
    #[error("error occurred when updating")]
    Tick(#[source] anyhow::Error),

    #[error("key {phase} listener failed")]
    Listener {
        phase: KeyPhase,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to read config file {path}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    ConfigInvalid(String),

    #[error("failed to create event loop")]
    EventLoop(#[source] winit::error::EventLoopError),

    #[error("failed to create application window")]
    Window(#[source] winit::error::OsError),

    #[error("failed to initialize pixel surface")]
    Surface(#[source] pixels::Error),

    #[error("failed to present frame")]
    Present(#[source] pixels::Error),

    #[error("failed to spawn engine loop thread")]
    Spawn(#[source] std::io::Error),

    #[error("engine loop thread panicked")]
    LoopPanicked,

    /// The loop thread was still inside a tick when the shutdown wait ran out
    /// and has been left running detached.
    #[error("engine loop did not finish within {0:?}")]
    LoopDetached(std::time::Duration),
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
