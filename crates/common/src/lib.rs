//! Common types, wire records, and errors shared across the envelope crates.

pub mod error;
pub mod protocol;

pub use error::{EnvelopeError, ErrorKind, Result};
pub use protocol::Payload;
