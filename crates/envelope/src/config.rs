//! Configuration loading and validation for the envelope cipher.
//!
//! Values are read from environment variables. Only the key itself is
//! required; it is validated here so that a bad `APP_KEY` is reported once at
//! startup rather than on the first encrypt call.

use common::{EnvelopeError, Result};
use serde::Deserialize;

use crate::crypto::cipher::check_key_len;
use crate::key::resolve_key;

/// Validated envelope cipher configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Application key, `base64:<base64 of 32 bytes>`. **Required.**
    #[serde(default)]
    pub app_key: Option<String>,

    /// Whether to keep the decoded key in a [`KeyCache`](crate::key::KeyCache)
    /// instead of decoding it on every call.
    #[serde(default = "default_app_key_cache")]
    pub app_key_cache: bool,
}

fn default_app_key_cache() -> bool {
    false
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Configuration`] if the environment cannot be
    /// read into a [`Config`] or if `APP_KEY` is missing or invalid.
    pub fn from_env() -> Result<Self> {
        Self::load(config::Environment::default())
    }

    fn load(env: config::Environment) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(env)
            .build()
            .map_err(|e| {
                EnvelopeError::configuration(format!("failed to build configuration from environment: {e}"))
            })?;

        let c: Config = cfg
            .try_deserialize()
            .map_err(|e| EnvelopeError::configuration(format!("failed to deserialise configuration: {e}")))?;

        c.validate()?;
        Ok(c)
    }

    /// Check that the key decodes to exactly the length the cipher needs.
    pub fn validate(&self) -> Result<()> {
        let key = resolve_key(self.app_key.as_deref())?;
        check_key_len(key.as_bytes())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("app_key", &self.app_key.as_ref().map(|_| "[REDACTED]"))
            .field("app_key_cache", &self.app_key_cache)
            .finish()
    }
}
