//! Where the raw application key value comes from.

use zeroize::Zeroizing;

/// Environment variable conventionally holding the application key.
pub const APP_KEY_VAR: &str = "APP_KEY";

/// Yields the raw, still-encoded application key value.
///
/// Implementations must not log or cache the value themselves; caching is
/// [`KeyCache`](super::KeyCache)'s job.
#[cfg_attr(test, mockall::automock)]
pub trait KeySource: Send + Sync {
    /// Return the current raw value, or `None` if it is not set.
    fn read(&self) -> Option<Zeroizing<String>>;
}

/// A key value fixed at construction, e.g. from [`Config`](crate::config::Config).
#[derive(Clone, Default)]
pub struct StaticKeySource {
    value: Option<Zeroizing<String>>,
}

impl StaticKeySource {
    /// Source that always yields `value`.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Some(Zeroizing::new(value.into())),
        }
    }

    /// Source that yields `value` if present and reports an unset key otherwise.
    pub fn from_option(value: Option<String>) -> Self {
        Self {
            value: value.map(Zeroizing::new),
        }
    }
}

impl KeySource for StaticKeySource {
    fn read(&self) -> Option<Zeroizing<String>> {
        self.value.clone()
    }
}

impl std::fmt::Debug for StaticKeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticKeySource")
            .field("set", &self.value.is_some())
            .finish()
    }
}

/// Reads an environment variable on every call.
#[derive(Debug, Clone)]
pub struct EnvKeySource {
    var: String,
}

impl EnvKeySource {
    /// Source reading the named variable.
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    /// Source reading [`APP_KEY_VAR`].
    pub fn app_key() -> Self {
        Self::new(APP_KEY_VAR)
    }

    /// Name of the variable this source reads.
    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvKeySource {
    fn default() -> Self {
        Self::app_key()
    }
}

impl KeySource for EnvKeySource {
    fn read(&self) -> Option<Zeroizing<String>> {
        // A non-UTF-8 value is treated as unset.
        std::env::var(&self.var).ok().map(Zeroizing::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_source_yields_value() {
        let source = StaticKeySource::new("base64:AAAA");
        assert_eq!(source.read().unwrap().as_str(), "base64:AAAA");
        assert!(StaticKeySource::from_option(None).read().is_none());
        assert!(StaticKeySource::default().read().is_none());
    }

    #[test]
    fn static_source_redacted_in_debug() {
        let printed = format!("{:?}", StaticKeySource::new("base64:secret"));
        assert!(!printed.contains("secret"));
        assert!(printed.contains("set: true"));
    }

    #[test]
    fn env_source_defaults_to_app_key() {
        assert_eq!(EnvKeySource::default().var(), APP_KEY_VAR);
    }

    #[test]
    fn env_source_reads_on_every_call() {
        let var = "ENVELOPE_TEST_ENV_SOURCE_KEY";
        let source = EnvKeySource::new(var);

        std::env::remove_var(var);
        assert!(source.read().is_none());

        std::env::set_var(var, "base64:first");
        assert_eq!(source.read().unwrap().as_str(), "base64:first");

        std::env::set_var(var, "base64:second");
        assert_eq!(source.read().unwrap().as_str(), "base64:second");

        std::env::remove_var(var);
    }
}
