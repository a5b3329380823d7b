//! [`KeyCache`]: read-mostly cache for the decoded application key.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use common::Result;
use zeroize::Zeroizing;

use super::{resolve_key, KeyMaterial};

/// A decoded key together with the raw value it was decoded from.
struct CachedKey {
    raw: Zeroizing<String>,
    key: KeyMaterial,
}

/// Caches the last successfully decoded key.
///
/// Backed by [`ArcSwapOption`] so that:
/// - Concurrent lookups never take a lock.
/// - A lookup that sees a different raw value decodes it and atomically swaps
///   the new pair in. A failed decode empties the cache.
#[derive(Clone, Default)]
pub struct KeyCache {
    inner: Arc<ArcSwapOption<CachedKey>>,
}

impl KeyCache {
    /// Create a new, empty [`KeyCache`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a key is currently cached.
    pub fn is_ready(&self) -> bool {
        self.inner.load().is_some()
    }

    /// Return the cached key if `raw` matches the value it was decoded from,
    /// otherwise decode `raw` and cache the result.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Configuration`](common::EnvelopeError::Configuration)
    /// if `raw` cannot be decoded.
    pub fn get_or_resolve(&self, raw: Option<&str>) -> Result<KeyMaterial> {
        if let (Some(raw), Some(cached)) = (raw, &*self.inner.load()) {
            if cached.raw.as_str() == raw {
                return Ok(cached.key.clone());
            }
        }

        match resolve_key(raw) {
            Ok(key) => {
                if let Some(raw) = raw {
                    self.inner.store(Some(Arc::new(CachedKey {
                        raw: Zeroizing::new(raw.to_owned()),
                        key: key.clone(),
                    })));
                }
                Ok(key)
            }
            Err(e) => {
                self.clear();
                Err(e)
            }
        }
    }

    /// Drop the cached key.
    pub fn clear(&self) {
        self.inner.store(None);
    }
}

impl std::fmt::Debug for KeyCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyCache")
            .field("ready", &self.is_ready())
            .finish()
    }
}
