//! AES-256-GCM primitives with detached authentication tags.
//!
//! This module knows nothing about the envelope text format or where keys
//! come from. It seals and opens byte slices under a caller-supplied key and
//! reports wrong-length keys as configuration errors before any cipher work.

pub mod cipher;

pub use cipher::{Sealed, KEY_LEN, NONCE_LEN, TAG_LEN};
