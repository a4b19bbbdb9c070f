use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{EngineError, Result};

/// Window and loop settings, usually read from a TOML file.
///
/// Every field is optional in the file; missing ones fall back to
/// [`EngineConfig::default`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Tick rate cap in frames per second. Zero or negative means unlimited.
    pub max_fps: f64,
    /// How long `start` waits for the loop thread after the window closes.
    pub shutdown_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "pixel-engine".to_string(),
            width: 900,
            height: 500,
            max_fps: 1.0,
            shutdown_timeout_ms: 2000,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| EngineError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Like [`from_path`](Self::from_path), but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::from_path(path)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::ConfigInvalid(format!(
                "framebuffer size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.shutdown_timeout_ms == 0 {
            return Err(EngineError::ConfigInvalid(
                "shutdown_timeout_ms must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}
