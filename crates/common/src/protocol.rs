//! The inner record of an encrypted envelope.
//!
//! The record is serialised as compact JSON and then base64-encoded once more
//! to form the envelope text:
//!
//! ```text
//! base64({"iv":"<base64 nonce>","tag":"<base64 tag>","value":"<base64 ciphertext>"})
//! ```
//!
//! The field names are a wire contract shared with previously stored
//! ciphertexts and must not change.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EnvelopeError, Result};

/// Wire names of the required record fields, in the order they are checked
/// when parsing.
pub const REQUIRED_FIELDS: [&str; 3] = ["iv", "value", "tag"];

/// Inner envelope record. All three fields hold standard padded base64 text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// Base64 of the nonce.
    pub iv: String,
    /// Base64 of the detached authentication tag.
    pub tag: String,
    /// Base64 of the ciphertext.
    pub value: String,
}

impl Payload {
    /// Serialise the record to compact JSON.
    ///
    /// `serde_json` never escapes `/`, which keeps the output byte-compatible
    /// with envelopes written by other producers of this format.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| EnvelopeError::encoding(format!("failed to encode payload: {e}")))
    }

    /// Parse a record from JSON text.
    ///
    /// Unknown fields are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Encoding`] if the text is not a JSON object,
    /// or if `iv`, `value` or `tag` is absent or not a string.
    pub fn from_json(text: &str) -> Result<Self> {
        let parsed: Value = serde_json::from_str(text)
            .map_err(|e| EnvelopeError::encoding(format!("payload is not valid JSON: {e}")))?;

        let object = parsed
            .as_object()
            .ok_or_else(|| EnvelopeError::encoding("payload is not a JSON object"))?;

        let field = |name: &str| {
            object
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_owned)
                .ok_or_else(|| EnvelopeError::encoding(format!("payload is invalid: {name} not given")))
        };

        let iv = field(REQUIRED_FIELDS[0])?;
        let value = field(REQUIRED_FIELDS[1])?;
        let tag = field(REQUIRED_FIELDS[2])?;

        Ok(Self { iv, tag, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn sample() -> Payload {
        Payload {
            iv: "AAAAAAAAAAAAAAAA".into(),
            tag: "ab/cd+ef/gh+ijklmnopqA==".into(),
            value: "zz/y".into(),
        }
    }

    #[test]
    fn json_field_names_and_order() {
        let json = sample().to_json().unwrap();
        assert_eq!(
            json,
            r#"{"iv":"AAAAAAAAAAAAAAAA","tag":"ab/cd+ef/gh+ijklmnopqA==","value":"zz/y"}"#
        );
    }

    #[test]
    fn slashes_are_not_escaped() {
        let json = sample().to_json().unwrap();
        assert!(!json.contains("\\/"));
        assert!(json.contains("ab/cd"));
    }

    #[test]
    fn parse_round_trip() {
        let json = sample().to_json().unwrap();
        assert_eq!(Payload::from_json(&json).unwrap(), sample());
    }

    #[test]
    fn parse_ignores_unknown_fields() {
        let json = r#"{"iv":"a","tag":"b","value":"c","mac":"d"}"#;
        let p = Payload::from_json(json).unwrap();
        assert_eq!(p.value, "c");
    }

    #[test]
    fn parse_rejects_invalid_json() {
        let err = Payload::from_json("{not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encoding);
    }

    #[test]
    fn parse_rejects_non_object() {
        let err = Payload::from_json(r#"["iv","tag","value"]"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encoding);
    }

    #[test]
    fn parse_rejects_each_missing_field() {
        for missing in REQUIRED_FIELDS {
            let mut obj = serde_json::json!({"iv": "a", "tag": "b", "value": "c"});
            obj.as_object_mut().unwrap().remove(missing);
            let err = Payload::from_json(&obj.to_string()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Encoding);
            assert!(err.to_string().contains(missing), "{err}");
        }
    }

    #[test]
    fn parse_rejects_non_string_field() {
        let err = Payload::from_json(r#"{"iv":"a","tag":16,"value":"c"}"#).unwrap_err();
        assert!(err.to_string().contains("tag not given"));

        let err = Payload::from_json(r#"{"iv":null,"tag":"b","value":"c"}"#).unwrap_err();
        assert!(err.to_string().contains("iv not given"));
    }
}
