//! Frame decoding
//!
//! One transport message is one frame: UTF-8 JSON text whose top level must
//! be an object. Anything else is a decode failure that the caller drops.

use serde_json::Value;
use thiserror::Error;

use kinepong_core::KinepongError;

use crate::{FieldAccess, Object};

/// Maximum accepted payload length in bytes
pub const MAX_FRAME_LEN: usize = 1 << 20;

/// Preview length used when logging a rejected payload
pub const PREVIEW_LEN: usize = 200;

/// Frame decode failures
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Empty frame")]
    Empty,

    #[error("Frame too large: {actual} > {max}")]
    TooLarge { actual: usize, max: usize },

    #[error("Malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Top level is not a mapping: found {found}")]
    NotAMapping { found: &'static str },
}

impl From<DecodeError> for KinepongError {
    fn from(err: DecodeError) -> Self {
        KinepongError::Decode(err.to_string())
    }
}

/// A decoded frame: the top-level keyed mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseDocument {
    root: Object,
}

impl PoseDocument {
    pub fn new(root: Object) -> Self {
        PoseDocument { root }
    }

    pub fn root(&self) -> &Object {
        &self.root
    }

    /// Top-level keys, for debug logging
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.root.keys().map(String::as_str)
    }
}

impl FieldAccess for PoseDocument {
    #[inline]
    fn field(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }
}

/// Decode one text frame
pub fn decode_frame(text: &str) -> Result<PoseDocument, DecodeError> {
    if text.len() > MAX_FRAME_LEN {
        return Err(DecodeError::TooLarge {
            actual: text.len(),
            max: MAX_FRAME_LEN,
        });
    }
    if text.trim().is_empty() {
        return Err(DecodeError::Empty);
    }

    match serde_json::from_str::<Value>(text)? {
        Value::Object(root) => Ok(PoseDocument { root }),
        other => Err(DecodeError::NotAMapping {
            found: value_kind(&other),
        }),
    }
}

/// Human-readable JSON type name
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// First `max_chars` characters of a payload, cut on a char boundary
pub fn payload_preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decode_mapping() {
        let doc = decode_frame(r#"{"players": []}"#).unwrap();
        assert!(doc.get_array("players").is_some());
        assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["players"]);
    }

    #[test]
    fn test_decode_rejects_wrong_top_level() {
        for (text, kind) in [
            ("[1, 2, 3]", "array"),
            ("\"players\"", "string"),
            ("42", "number"),
            ("true", "bool"),
            ("null", "null"),
        ] {
            match decode_frame(text) {
                Err(DecodeError::NotAMapping { found }) => assert_eq!(found, kind),
                other => panic!("expected NotAMapping for {text}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_decode_rejects_truncated() {
        let err = decode_frame(r#"{"players": [{"hands": [{"x": 0.5,"#).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn test_decode_rejects_empty() {
        assert!(matches!(decode_frame(""), Err(DecodeError::Empty)));
        assert!(matches!(decode_frame("   \n"), Err(DecodeError::Empty)));
    }

    #[test]
    fn test_decode_rejects_oversized() {
        let text = format!("{{\"pad\": \"{}\"}}", "a".repeat(MAX_FRAME_LEN));
        assert!(matches!(
            decode_frame(&text),
            Err(DecodeError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_payload_preview_char_boundary() {
        let text = "가나다라마";
        assert_eq!(payload_preview(text, 2), "가나");
        assert_eq!(payload_preview(text, 50), text);
    }

    proptest! {
        #[test]
        fn prop_decode_never_panics(text in ".{0,256}") {
            let _ = decode_frame(&text);
        }

        #[test]
        fn prop_non_object_json_rejected(n in any::<i64>(), s in "[a-z]{0,16}") {
            let number = n.to_string();
            let string = format!("\"{}\"", s);
            prop_assert!(
                matches!(decode_frame(&number), Err(DecodeError::NotAMapping { .. })),
                "number payload must be rejected as a non-mapping"
            );
            prop_assert!(
                matches!(decode_frame(&string), Err(DecodeError::NotAMapping { .. })),
                "string payload must be rejected as a non-mapping"
            );
        }
    }
}
