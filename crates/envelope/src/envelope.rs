//! Envelope text encoding and decoding.
//!
//! # Format
//!
//! ```text
//! base64({"iv":"<base64 nonce>","tag":"<base64 tag>","value":"<base64 ciphertext>"})
//! ```
//!
//! All base64 is the standard padded alphabet. Decoding checks structure and
//! lengths before the cipher runs, so malformed input is rejected with a
//! precise error instead of reaching AES-GCM.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::{EnvelopeError, Payload, Result};
use tracing::warn;
use zeroize::Zeroizing;

use crate::crypto::{cipher, Sealed, NONCE_LEN, TAG_LEN};
use crate::key::KeyMaterial;

/// Encrypt `plaintext` and pack it into envelope text.
///
/// `aad` is authenticated but not stored in the envelope; the same bytes must
/// be supplied to [`open`].
///
/// # Errors
///
/// Returns [`EnvelopeError::Configuration`] for a wrong-length key and
/// [`EnvelopeError::Crypto`] if the cipher fails.
pub fn seal(plaintext: &[u8], aad: &[u8], key: &KeyMaterial) -> Result<String> {
    let sealed = cipher::seal(plaintext, aad, key.as_bytes())?;
    encode(&sealed)
}

/// Unpack envelope text and decrypt it.
///
/// # Errors
///
/// - [`EnvelopeError::Encoding`] if any base64 layer or the record is malformed.
/// - [`EnvelopeError::Validation`] if `iv` or `tag` has the wrong length.
/// - [`EnvelopeError::Configuration`] for a wrong-length key.
/// - [`EnvelopeError::Crypto`] if authentication fails.
pub fn open(text: &str, aad: &[u8], key: &KeyMaterial) -> Result<Zeroizing<Vec<u8>>> {
    let sealed = decode(text)?;
    cipher::open(&sealed.nonce, &sealed.tag, &sealed.ciphertext, aad, key.as_bytes()).map_err(|e| {
        if matches!(e, EnvelopeError::Crypto(_)) {
            warn!(
                ciphertext_len = sealed.ciphertext.len(),
                "envelope failed authentication; wrong key or tampered data"
            );
        }
        e
    })
}

/// Render a [`Sealed`] value as envelope text.
pub fn encode(sealed: &Sealed) -> Result<String> {
    let payload = Payload {
        iv: STANDARD.encode(sealed.nonce),
        tag: STANDARD.encode(sealed.tag),
        value: STANDARD.encode(&sealed.ciphertext),
    };
    Ok(STANDARD.encode(payload.to_json()?))
}

/// Parse and validate envelope text without decrypting it.
///
/// # Errors
///
/// [`EnvelopeError::Encoding`] or [`EnvelopeError::Validation`] as listed on [`open`].
pub fn decode(text: &str) -> Result<Sealed> {
    let outer = STANDARD
        .decode(text.trim())
        .map_err(|e| EnvelopeError::encoding(format!("envelope is not valid base64: {e}")))?;
    let json = std::str::from_utf8(&outer)
        .map_err(|_| EnvelopeError::encoding("envelope payload is not valid UTF-8"))?;
    let payload = Payload::from_json(json)?;

    let nonce: [u8; NONCE_LEN] = fixed_len("iv", &decode_field("iv", &payload.iv)?)?;
    let tag: [u8; TAG_LEN] = fixed_len("tag", &decode_field("tag", &payload.tag)?)?;
    let ciphertext = decode_field("value", &payload.value)?;

    Ok(Sealed {
        nonce,
        tag,
        ciphertext,
    })
}

fn decode_field(field: &str, value: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(value)
        .map_err(|e| EnvelopeError::encoding(format!("{field} is not valid base64: {e}")))
}

fn fixed_len<const N: usize>(field: &'static str, bytes: &[u8]) -> Result<[u8; N]> {
    bytes.try_into().map_err(|_| EnvelopeError::Validation {
        field,
        expected: N,
        actual: bytes.len(),
    })
}
