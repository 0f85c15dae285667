// Canonical JSON serialization
//
// Block hashes are taken over this form, so it must be byte-for-byte stable:
// object keys sorted, `", "` between items, `": "` after keys, and every
// non-ASCII character escaped as `\uXXXX`.

use crate::error::Result;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Write;

/// Serialize a value into canonical JSON text
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value)?;
    let mut out = String::new();
    write_value(&mut out, &value);
    Ok(out)
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_string(out, key);
                out.push_str(": ");
                write_value(out, &map[key]);
            }
            out.push('}');
        }
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 || (c as u32) > 0x7e => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    let _ = write!(out, "\\u{:04x}", unit);
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sorted_keys_and_separators() {
        let value = json!({"b": 1, "a": [1, 2], "c": {"z": true, "y": null}});
        assert_eq!(
            canonical_json(&value).unwrap(),
            r#"{"a": [1, 2], "b": 1, "c": {"y": null, "z": true}}"#
        );
    }

    #[test]
    fn test_float_keeps_fraction() {
        let value = json!({"amount": 100.0});
        assert_eq!(canonical_json(&value).unwrap(), r#"{"amount": 100.0}"#);
    }

    #[test]
    fn test_non_ascii_escaped() {
        let value = json!("caf\u{e9} \u{1F600}");
        assert_eq!(
            canonical_json(&value).unwrap(),
            r#""caf\u00e9 \ud83d\ude00""#
        );
    }

    #[test]
    fn test_struct_field_order_is_irrelevant() {
        #[derive(Serialize)]
        struct Forward {
            alpha: u8,
            beta: u8,
        }
        #[derive(Serialize)]
        struct Reverse {
            beta: u8,
            alpha: u8,
        }

        let a = canonical_json(&Forward { alpha: 1, beta: 2 }).unwrap();
        let b = canonical_json(&Reverse { beta: 2, alpha: 1 }).unwrap();
        assert_eq!(a, b);
    }
}
