//! Structural descriptions for diagnostics.
//!
//! Failure messages never embed raw native values; they embed a short
//! structural summary instead, which stays serializable and stable across hosts.

use std::panic::{self, AssertUnwindSafe};

use super::NativeValue;

/// Describes the shape of `value`: kind, constructor-like name, and up to
/// `key_limit` keys.
///
/// ## Example
/// ```rust
/// use notibridge::{describe, NativeValue};
///
/// let value = NativeValue::object([
///     ("a", NativeValue::Null),
///     ("b", NativeValue::from(true)),
///     ("c", NativeValue::from("secret")),
/// ]);
/// assert_eq!(describe(&value, 2), "object(Object) keys=[a, b, …] (3 total)");
/// ```
pub fn describe(value: &NativeValue, key_limit: usize) -> String {
    match value {
        NativeValue::Undefined => "undefined".to_string(),
        NativeValue::Null => "null".to_string(),
        NativeValue::Bool(_) => "boolean".to_string(),
        NativeValue::Number(_) => "number".to_string(),
        NativeValue::String(s) => format!("string(len={})", s.chars().count()),
        NativeValue::Array(items) => format!("array(len={})", items.len()),
        NativeValue::Object(fields) => {
            let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
            format!("object(Object) {}", key_summary(&keys, key_limit))
        }
        NativeValue::Map(map) => {
            let keys = panic::catch_unwind(AssertUnwindSafe(|| map.keys()));
            match keys {
                Ok(keys) => {
                    let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
                    format!("map({}) {}", map.type_name(), key_summary(&keys, key_limit))
                }
                Err(_) => format!("map({}) keys=<unavailable>", map.type_name()),
            }
        }
    }
}

fn key_summary(keys: &[&str], limit: usize) -> String {
    let limit = limit.max(1);
    if keys.len() <= limit {
        format!("keys=[{}]", keys.join(", "))
    } else {
        format!("keys=[{}, …] ({} total)", keys[..limit].join(", "), keys.len())
    }
}
