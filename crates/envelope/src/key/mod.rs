//! Application key resolution.
//!
//! # Lifecycle
//!
//! 1. A [`KeySource`] yields the raw configuration value (conventionally
//!    `APP_KEY`), formatted as `base64:<base64 of 32 bytes>`.
//! 2. [`resolve_key`] checks the marker and decodes the remainder into
//!    [`KeyMaterial`]. Length is checked later, by the cipher.
//! 3. [`KeyResolver`] runs both steps on every call, optionally through a
//!    [`KeyCache`] that re-decodes only when the raw value changes.
//!
//! # Security invariants
//!
//! - Key bytes live in zeroizing buffers and are wiped on drop.
//! - Key material is never logged or printed in `Debug` output.

pub mod source;
pub mod store;

pub use source::{EnvKeySource, KeySource, StaticKeySource, APP_KEY_VAR};
pub use store::KeyCache;

use std::sync::Arc;

use aes_gcm::aead::{rand_core::RngCore, OsRng};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::{EnvelopeError, Result};
use zeroize::Zeroizing;

use crate::crypto::KEY_LEN;

/// Marker that must prefix every configured key.
pub const KEY_PREFIX: &str = "base64:";

/// Decoded key bytes, wiped on drop.
#[derive(Clone)]
pub struct KeyMaterial(Zeroizing<Vec<u8>>);

impl KeyMaterial {
    /// Wrap raw key bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Borrow the key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Number of key bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the key is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material, even in debug builds.
        f.write_str("KeyMaterial([REDACTED])")
    }
}

/// Decode a configured key value.
///
/// # Errors
///
/// Returns [`EnvelopeError::Configuration`] if `raw` is absent or empty, does
/// not start with [`KEY_PREFIX`], or its remainder is not valid base64.
pub fn resolve_key(raw: Option<&str>) -> Result<KeyMaterial> {
    let raw = match raw {
        Some(v) if !v.is_empty() => v,
        _ => {
            return Err(EnvelopeError::configuration(format!(
                "no application key defined; use {APP_KEY_VAR} to define an application key"
            )))
        }
    };

    let encoded = raw.strip_prefix(KEY_PREFIX).ok_or_else(|| {
        EnvelopeError::configuration(format!(
            "invalid application key; must be a base64-encoded value prefixed with '{KEY_PREFIX}'"
        ))
    })?;

    let bytes = STANDARD
        .decode(encoded)
        .map_err(|_| EnvelopeError::configuration("invalid application key; could not be base64-decoded"))?;

    Ok(KeyMaterial::new(bytes))
}

/// Generate a fresh random key in the configured-value format.
pub fn generate_key() -> Zeroizing<String> {
    let mut bytes = Zeroizing::new([0u8; KEY_LEN]);
    OsRng.fill_bytes(&mut bytes[..]);
    Zeroizing::new(format!("{KEY_PREFIX}{}", STANDARD.encode(&bytes[..])))
}

/// Resolves [`KeyMaterial`] from a [`KeySource`] on every call.
#[derive(Clone)]
pub struct KeyResolver {
    source: Arc<dyn KeySource>,
    cache: Option<KeyCache>,
}

impl KeyResolver {
    /// Create a resolver that decodes the source value on every call.
    pub fn new(source: impl KeySource + 'static) -> Self {
        Self {
            source: Arc::new(source),
            cache: None,
        }
    }

    /// Route lookups through a [`KeyCache`].
    pub fn with_cache(mut self) -> Self {
        self.cache = Some(KeyCache::new());
        self
    }

    /// Returns `true` if lookups go through a cache.
    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    /// Read the source and decode its value.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Configuration`] as described on [`resolve_key`].
    pub fn resolve(&self) -> Result<KeyMaterial> {
        let raw = self.source.read();
        let raw = raw.as_ref().map(|v| v.as_str());
        match &self.cache {
            Some(cache) => cache.get_or_resolve(raw),
            None => resolve_key(raw),
        }
    }
}

impl std::fmt::Debug for KeyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyResolver")
            .field("cached", &self.is_cached())
            .finish_non_exhaustive()
    }
}
