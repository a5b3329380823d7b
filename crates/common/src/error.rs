//! Common error types shared across crates.

use thiserror::Error;

/// Result alias used throughout the envelope crates.
pub type Result<T, E = EnvelopeError> = std::result::Result<T, E>;

/// Top-level envelope error type.
///
/// Every variant is fatal to the call that produced it and deterministic in
/// its inputs, so none of them is worth retrying with the same key and text:
/// - [`EnvelopeError::Configuration`]: the key is absent or malformed.
/// - [`EnvelopeError::Encoding`]: the envelope text is corrupt or foreign.
/// - [`EnvelopeError::Validation`]: a nonce or tag has the wrong length.
/// - [`EnvelopeError::Crypto`]: authentication failed (tampering or wrong key).
/// - [`EnvelopeError::Serialization`]: the decrypted bytes are not the expected form.
///
/// Messages never include key material or plaintext.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The application key is missing, lacks the `base64:` marker, fails to
    /// decode, or has the wrong length for the cipher.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The outer base64 layer, the inner record, or one of its fields could
    /// not be decoded.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// A decoded envelope field has a length other than the cipher requires.
    #[error("invalid {field} length: expected {expected}, got {actual}")]
    Validation {
        /// Wire name of the offending field (`iv` or `tag`).
        field: &'static str,
        /// Length the cipher requires.
        expected: usize,
        /// Length found after decoding.
        actual: usize,
    },

    /// The AEAD operation failed.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// A value could not be serialised before encryption, or the decrypted
    /// bytes could not be deserialised.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Copyable discriminant of [`EnvelopeError`], for call sites that branch on
/// the failure kind without caring about the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Encoding,
    Validation,
    Crypto,
    Serialization,
}

impl EnvelopeError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EnvelopeError::Configuration(_) => ErrorKind::Configuration,
            EnvelopeError::Encoding(_) => ErrorKind::Encoding,
            EnvelopeError::Validation { .. } => ErrorKind::Validation,
            EnvelopeError::Crypto(_) => ErrorKind::Crypto,
            EnvelopeError::Serialization(_) => ErrorKind::Serialization,
        }
    }

    /// Shorthand for an [`EnvelopeError::Encoding`] with the given message.
    pub fn encoding(msg: impl Into<String>) -> Self {
        EnvelopeError::Encoding(msg.into())
    }

    /// Shorthand for an [`EnvelopeError::Configuration`] with the given message.
    pub fn configuration(msg: impl Into<String>) -> Self {
        EnvelopeError::Configuration(msg.into())
    }
}
