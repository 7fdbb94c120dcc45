//! Canonical JSON text.
//!
//! The identifier of a fingerprint is the digest of this text, so the same
//! logical record has to produce byte-identical output every time:
//!
//! - compact form, no insignificant whitespace
//! - object keys sorted by their UTF-8 bytes, at every nesting level
//! - array order preserved
//! - strings and numbers rendered by `serde_json`
//!
//! Key ordering is applied here rather than relying on the map type behind
//! `serde_json::Value`, so enabling `preserve_order` anywhere in the build
//! graph does not change identifiers.

use serde_json::Value;

/// Render `value` as canonical JSON text.
///
/// ```rust
/// use canonical::canonical_json;
/// use serde_json::json;
///
/// let a = canonical_json(&json!({"b": 1, "a": [true, null]}));
/// let b = canonical_json(&json!({"a": [true, null], "b": 1}));
/// assert_eq!(a, "{\"a\":[true,null],\"b\":1}");
/// assert_eq!(a, b);
/// ```
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::with_capacity(256);
    write_value(&mut out, value);
    out
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(out, key);
                out.push(':');
                write_value(out, item);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        // Scalars: `Display` on `Value` is the compact serde_json rendering.
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push_str(&Value::from(s).to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_keys_are_sorted() {
        let value = json!({
            "localeInfo": {"timezone": "UTC", "languages": ["en-US"], "language": "en-US"},
            "audioHash": "unavailable",
        });
        assert_eq!(
            canonical_json(&value),
            r#"{"audioHash":"unavailable","localeInfo":{"language":"en-US","languages":["en-US"],"timezone":"UTC"}}"#
        );
    }

    #[test]
    fn array_order_is_significant() {
        let a = canonical_json(&json!({"languages": ["en", "de"]}));
        let b = canonical_json(&json!({"languages": ["de", "en"]}));
        assert_ne!(a, b);
    }

    #[test]
    fn strings_are_escaped() {
        let value = json!({"userAgent": "quote \" and \\ and \n"});
        assert_eq!(
            canonical_json(&value),
            r#"{"userAgent":"quote \" and \\ and \n"}"#
        );
    }

    #[test]
    fn scalars_render_compactly() {
        assert_eq!(canonical_json(&json!(null)), "null");
        assert_eq!(canonical_json(&json!(false)), "false");
        assert_eq!(canonical_json(&json!(8)), "8");
        assert_eq!(canonical_json(&json!(0.5)), "0.5");
        assert_eq!(canonical_json(&json!({})), "{}");
        assert_eq!(canonical_json(&json!([])), "[]");
    }

    #[test]
    fn sentinel_substitution_changes_text() {
        let real = canonical_json(&json!({"canvasHash": "ab12"}));
        let sentinel = canonical_json(&json!({"canvasHash": "unsupported"}));
        assert_ne!(real, sentinel);
    }
}
