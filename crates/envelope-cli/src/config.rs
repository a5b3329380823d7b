//! Configuration loading for the CLI.
//!
//! The application key is loaded separately by [`envelope::Config`], and only
//! by commands that need it.

use anyhow::{Context, Result};
use serde::Deserialize;

/// CLI configuration read from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Tracing log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "warn".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build CLI configuration")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise CLI configuration")?;

        c.validate()?;
        Ok(c)
    }

    fn validate(&self) -> Result<()> {
        if self.log_level.trim().is_empty() {
            anyhow::bail!("LOG_LEVEL must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        assert_eq!(default_log_level(), "warn");
    }

    #[test]
    fn validate_rejects_empty_log_level() {
        let cfg = Config {
            log_level: "  ".into(),
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_accepts_valid_config() {
        let cfg = Config {
            log_level: "debug".into(),
        };
        assert!(cfg.validate().is_ok());
    }
}
