//! AES-256-GCM encryption and decryption of single in-memory values.
//!
//! Tags are kept detached from the ciphertext because the envelope carries
//! them in separate fields. Every call to [`seal`] draws a fresh 96-bit nonce
//! from the OS CSPRNG; GCM nonce reuse under one key breaks both
//! confidentiality and authentication.

use aes_gcm::{
    aead::{rand_core::RngCore, AeadInPlace, KeyInit, OsRng},
    Aes256Gcm, Nonce, Tag,
};
use common::{EnvelopeError, Result};
use zeroize::Zeroizing;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-GCM nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of an AES-GCM authentication tag.
pub const TAG_LEN: usize = 16;

/// Output of one authenticated encryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    /// Nonce used for this encryption.
    pub nonce: [u8; NONCE_LEN],
    /// Detached authentication tag.
    pub tag: [u8; TAG_LEN],
    /// Ciphertext, same length as the plaintext.
    pub ciphertext: Vec<u8>,
}

/// Encrypt `plaintext` under `key`, authenticating `aad` alongside it.
///
/// # Errors
///
/// Returns [`EnvelopeError::Configuration`] if `key` is not [`KEY_LEN`] bytes.
/// Returns [`EnvelopeError::Crypto`] on an internal AEAD error.
pub fn seal(plaintext: &[u8], aad: &[u8], key: &[u8]) -> Result<Sealed> {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);
    seal_with_nonce(plaintext, aad, key, nonce)
}

/// Encrypt with an explicit nonce. Only [`seal`] and known-answer tests call this.
pub(crate) fn seal_with_nonce(
    plaintext: &[u8],
    aad: &[u8],
    key: &[u8],
    nonce: [u8; NONCE_LEN],
) -> Result<Sealed> {
    let cipher = build_cipher(key)?;

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(&nonce), aad, &mut buffer)
        .map_err(|_| EnvelopeError::Crypto("failed to encrypt data".into()))?;

    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(tag.as_slice());

    Ok(Sealed {
        nonce,
        tag: tag_bytes,
        ciphertext: buffer,
    })
}

/// Decrypt and authenticate `ciphertext`.
///
/// The plaintext is returned in a buffer that is wiped on drop.
///
/// # Errors
///
/// Returns [`EnvelopeError::Configuration`] if `key` is not [`KEY_LEN`] bytes.
/// Returns [`EnvelopeError::Crypto`] if authentication fails (wrong key,
/// wrong associated data, or tampered nonce, tag or ciphertext).
pub fn open(
    nonce: &[u8; NONCE_LEN],
    tag: &[u8; TAG_LEN],
    ciphertext: &[u8],
    aad: &[u8],
    key: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    let cipher = build_cipher(key)?;

    let mut buffer = Zeroizing::new(ciphertext.to_vec());
    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(nonce),
            aad,
            buffer.as_mut_slice(),
            Tag::from_slice(tag),
        )
        .map_err(|_| EnvelopeError::Crypto("failed to decrypt data".into()))?;

    Ok(buffer)
}

/// Reject keys the cipher cannot use.
///
/// # Errors
///
/// Returns [`EnvelopeError::Configuration`] naming the expected and actual length.
pub fn check_key_len(key: &[u8]) -> Result<()> {
    if key.len() != KEY_LEN {
        return Err(EnvelopeError::configuration(format!(
            "invalid application key length: expected {KEY_LEN} bytes, got {}",
            key.len()
        )));
    }
    Ok(())
}

fn build_cipher(key: &[u8]) -> Result<Aes256Gcm> {
    check_key_len(key)?;
    Aes256Gcm::new_from_slice(key).map_err(|_| {
        EnvelopeError::configuration(format!("invalid application key length: expected {KEY_LEN} bytes"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ErrorKind;

    fn random_key() -> Vec<u8> {
        let mut key = vec![0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        key
    }

    #[test]
    fn seal_open_round_trip() {
        let key = random_key();
        let sealed = seal(b"123-45-6789", b"", &key).unwrap();
        let opened = open(&sealed.nonce, &sealed.tag, &sealed.ciphertext, b"", &key).unwrap();
        assert_eq!(opened.as_slice(), b"123-45-6789");
    }

    #[test]
    fn ciphertext_length_matches_plaintext() {
        let key = random_key();
        let sealed = seal(&[7u8; 100], b"", &key).unwrap();
        assert_eq!(sealed.ciphertext.len(), 100);
    }

    #[test]
    fn empty_plaintext_round_trip() {
        let key = random_key();
        let sealed = seal(b"", b"", &key).unwrap();
        assert!(sealed.ciphertext.is_empty());
        let opened = open(&sealed.nonce, &sealed.tag, &sealed.ciphertext, b"", &key).unwrap();
        assert!(opened.is_empty());
    }

    #[test]
    fn zero_key_known_answer() {
        // AES-256-GCM, K = 0^256, IV = 0^96, P = 0^128.
        let sealed = seal_with_nonce(&[0u8; 16], b"", &[0u8; KEY_LEN], [0u8; NONCE_LEN]).unwrap();
        assert_eq!(
            sealed.ciphertext,
            [
                0xce, 0xa7, 0x40, 0x3d, 0x4d, 0x60, 0x6b, 0x6e, 0x07, 0x4e, 0xc5, 0xd3, 0xba,
                0xf3, 0x9d, 0x18
            ]
        );
        assert_eq!(
            sealed.tag,
            [
                0xd0, 0xd1, 0xc8, 0xa7, 0x99, 0x99, 0x6b, 0xf0, 0x26, 0x5b, 0x98, 0xb5, 0xd4,
                0x8a, 0xb9, 0x19
            ]
        );
    }

    #[test]
    fn fresh_nonce_per_call() {
        let key = random_key();
        let a = seal(b"same", b"", &key).unwrap();
        let b = seal(b"same", b"", &key).unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let sealed = seal(b"secret", b"", &random_key()).unwrap();
        let err = open(&sealed.nonce, &sealed.tag, &sealed.ciphertext, b"", &random_key())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Crypto);
    }

    #[test]
    fn associated_data_is_authenticated() {
        let key = random_key();
        let sealed = seal(b"secret", b"user:42", &key).unwrap();
        assert!(open(&sealed.nonce, &sealed.tag, &sealed.ciphertext, b"user:42", &key).is_ok());
        let err = open(&sealed.nonce, &sealed.tag, &sealed.ciphertext, b"user:43", &key)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Crypto);
    }

    #[test]
    fn tampered_parts_fail_authentication() {
        let key = random_key();
        let sealed = seal(b"tamper me", b"", &key).unwrap();

        let mut ciphertext = sealed.ciphertext.clone();
        ciphertext[0] ^= 0x01;
        assert!(open(&sealed.nonce, &sealed.tag, &ciphertext, b"", &key).is_err());

        let mut tag = sealed.tag;
        tag[TAG_LEN - 1] ^= 0x80;
        assert!(open(&sealed.nonce, &tag, &sealed.ciphertext, b"", &key).is_err());

        let mut nonce = sealed.nonce;
        nonce[0] ^= 0x01;
        assert!(open(&nonce, &sealed.tag, &sealed.ciphertext, b"", &key).is_err());
    }

    #[test]
    fn invalid_key_length_rejected() {
        let err = seal(b"x", b"", &[0u8; 16]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("expected 32 bytes, got 16"));

        let err = open(&[0u8; NONCE_LEN], &[0u8; TAG_LEN], b"", b"", &[0u8; 33]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
