//! [`Crypter`]: encrypts and decrypts single values into envelope text.

use common::{EnvelopeError, Result};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use crate::codec::{Codec, JsonCodec};
use crate::config::Config;
use crate::envelope;
use crate::key::{KeyResolver, KeySource, StaticKeySource};

/// Associated data bound into every envelope. The façade supplies none.
const NO_AAD: &[u8] = &[];

/// Envelope cipher keyed from a [`KeySource`].
///
/// The key is resolved on every call (or through a cache if enabled), so a
/// `Crypter` holds no key material between calls. It is `Send + Sync` and can
/// be shared across threads without coordination.
///
/// ```no_run
/// use envelope::{Crypter, EnvKeySource};
///
/// let crypter = Crypter::new(EnvKeySource::app_key());
/// let text = crypter.encrypt_string("hello")?;
/// assert_eq!(crypter.decrypt_string(&text)?, "hello");
/// # Ok::<(), envelope::EnvelopeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Crypter<C = JsonCodec> {
    keys: KeyResolver,
    codec: C,
}

impl Crypter<JsonCodec> {
    /// Create a crypter reading its key from `source` with the JSON codec.
    pub fn new(source: impl KeySource + 'static) -> Self {
        Self {
            keys: KeyResolver::new(source),
            codec: JsonCodec,
        }
    }

    /// Create a crypter from a loaded [`Config`].
    pub fn from_config(cfg: &Config) -> Self {
        let crypter = Self::new(StaticKeySource::from_option(cfg.app_key.clone()));
        if cfg.app_key_cache {
            crypter.with_key_cache()
        } else {
            crypter
        }
    }

    /// Load [`Config`] from the environment and build a crypter from it.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Configuration`] if `APP_KEY` is missing or invalid.
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_config(&Config::from_env()?))
    }
}

impl<C: Codec> Crypter<C> {
    /// Swap the serialisation codec used by [`encrypt`](Self::encrypt) and
    /// [`decrypt`](Self::decrypt).
    pub fn with_codec<D: Codec>(self, codec: D) -> Crypter<D> {
        Crypter {
            keys: self.keys,
            codec,
        }
    }

    /// Keep the decoded key in a cache that is refreshed when the raw
    /// configuration value changes.
    pub fn with_key_cache(mut self) -> Self {
        self.keys = self.keys.with_cache();
        self
    }

    /// Serialise `value` with the codec and encrypt it.
    ///
    /// # Errors
    ///
    /// [`EnvelopeError::Serialization`] if the codec fails, then any error
    /// listed on [`encrypt_bytes`](Self::encrypt_bytes).
    pub fn encrypt<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let plaintext = Zeroizing::new(self.codec.encode(value)?);
        self.encrypt_bytes(&plaintext)
    }

    /// Decrypt envelope text and deserialise the plaintext with the codec.
    ///
    /// # Errors
    ///
    /// Any error listed on [`decrypt_bytes`](Self::decrypt_bytes), then
    /// [`EnvelopeError::Serialization`] if the plaintext does not decode as `T`.
    pub fn decrypt<T: DeserializeOwned>(&self, text: &str) -> Result<T> {
        let plaintext = self.open(text)?;
        self.codec.decode(&plaintext)
    }

    /// Encrypt a string as-is, without serialisation.
    pub fn encrypt_string(&self, value: &str) -> Result<String> {
        self.encrypt_bytes(value.as_bytes())
    }

    /// Decrypt envelope text to the original string, without deserialisation.
    ///
    /// # Errors
    ///
    /// Any error listed on [`decrypt_bytes`](Self::decrypt_bytes), then
    /// [`EnvelopeError::Serialization`] if the plaintext is not UTF-8.
    pub fn decrypt_string(&self, text: &str) -> Result<String> {
        let plaintext = self.decrypt_bytes(text)?;
        String::from_utf8(plaintext)
            .map_err(|_| EnvelopeError::Serialization("decrypted value is not valid UTF-8".into()))
    }

    /// Encrypt raw bytes.
    ///
    /// # Errors
    ///
    /// [`EnvelopeError::Configuration`] if the key cannot be resolved or has
    /// the wrong length, [`EnvelopeError::Crypto`] if the cipher fails.
    pub fn encrypt_bytes(&self, plaintext: &[u8]) -> Result<String> {
        let key = self.keys.resolve()?;
        let text = envelope::seal(plaintext, NO_AAD, &key)?;
        debug!(
            plaintext_len = plaintext.len(),
            envelope_len = text.len(),
            "value encrypted"
        );
        Ok(text)
    }

    /// Decrypt envelope text to raw bytes.
    ///
    /// # Errors
    ///
    /// - [`EnvelopeError::Configuration`] if the key cannot be resolved.
    /// - [`EnvelopeError::Encoding`] if the envelope is malformed.
    /// - [`EnvelopeError::Validation`] if the nonce or tag length is wrong.
    /// - [`EnvelopeError::Crypto`] if authentication fails.
    pub fn decrypt_bytes(&self, text: &str) -> Result<Vec<u8>> {
        let plaintext = self.open(text)?;
        Ok(plaintext.to_vec())
    }

    fn open(&self, text: &str) -> Result<Zeroizing<Vec<u8>>> {
        let key = self.keys.resolve()?;
        let plaintext = envelope::open(text, NO_AAD, &key)?;
        debug!(
            envelope_len = text.len(),
            plaintext_len = plaintext.len(),
            "value decrypted"
        );
        Ok(plaintext)
    }
}
