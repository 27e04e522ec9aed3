//! Encoder configuration.
//!
//! Values are layered with `figment`, later layers winning:
//!
//! 1. built-in defaults
//! 2. an optional TOML file
//! 3. `VELESRQ_*` environment variables (`VELESRQ_DIMENSION`, `VELESRQ_SEED`,
//!    `VELESRQ_SKIP_ROTATION`)
//!
//! ```toml
//! dimension = 128
//! seed = 42
//! skip_rotation = false
//! ```

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::quantization::MAX_DIMENSION;

/// Seed used when none is configured. Documents and queries must share it.
pub const DEFAULT_SEED: u64 = 42;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "VELESRQ_";

/// Settings needed to build an [`RqEncoder`](crate::RqEncoder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Vector dimension. 0 means "not set" and fails validation.
    pub dimension: usize,
    /// Rotation seed.
    pub seed: u64,
    /// Bypass the rotation step.
    pub skip_rotation: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            dimension: 0,
            seed: DEFAULT_SEED,
            skip_rotation: false,
        }
    }
}

impl EncoderConfig {
    /// Builds the provider chain without extracting it.
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Loads defaults, then `path` (if any), then the environment.
    ///
    /// Does not validate: callers may still override fields (e.g. from CLI
    /// flags) before calling [`Self::validate`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `path` does not exist or a value has the
    /// wrong type.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
        }
        let config: Self = Self::figment(path).extract()?;
        tracing::debug!(?config, "encoder configuration loaded");
        Ok(config)
    }

    /// Checks that the configuration can build an encoder.
    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(Error::Config("dimension must be greater than 0".into()));
        }
        if self.dimension > MAX_DIMENSION {
            return Err(Error::Config(format!(
                "dimension {} exceeds maximum {}",
                self.dimension, MAX_DIMENSION
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
