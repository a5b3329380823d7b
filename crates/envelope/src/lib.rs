//! Authenticated-encryption envelopes keyed from process configuration.
//!
//! Values are encrypted with AES-256-GCM under the application key
//! (`APP_KEY`, formatted `base64:<base64 of 32 bytes>`) and packed into a
//! self-describing text envelope carrying the nonce, tag and ciphertext.
//!
//! # Layers
//!
//! - [`key`]: resolves and optionally caches the application key.
//! - [`crypto`]: AES-256-GCM with detached tags.
//! - [`envelope`]: the text format and its structural validation.
//! - [`codec`]: serialisation for the generic value variant.
//! - [`Crypter`]: the façade tying them together.

pub mod codec;
pub mod config;
pub mod crypter;
pub mod crypto;
pub mod envelope;
pub mod key;

pub use codec::{BincodeCodec, Codec, JsonCodec};
pub use common::{EnvelopeError, ErrorKind, Payload, Result};
pub use config::Config;
pub use crypter::Crypter;
pub use key::{generate_key, EnvKeySource, KeyCache, KeyMaterial, KeySource, StaticKeySource};
