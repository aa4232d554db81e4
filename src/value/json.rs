//! Conversions between [`NativeValue`] and `serde_json::Value`.
//!
//! Outbound arguments (requests, ids) are serialized with serde and wrapped
//! as plain values. Inbound values are materialized through a
//! [`FieldReader`] so accessor objects become plain JSON before typed
//! deserialization.

use std::panic::{self, AssertUnwindSafe};

use serde_json::{Map, Number, Value};

use super::{FieldReader, NativeValue};

/// Nesting guard for self-referencing accessor objects.
const MAX_DEPTH: usize = 32;

impl From<Value> for NativeValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => NativeValue::Null,
            Value::Bool(b) => NativeValue::Bool(b),
            Value::Number(n) => NativeValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => NativeValue::String(s),
            Value::Array(items) => NativeValue::Array(items.into_iter().map(Into::into).collect()),
            Value::Object(fields) => {
                NativeValue::Object(fields.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

/// Converts `value` into plain JSON, reading accessor objects field by field.
///
/// - `Undefined` fields are dropped from objects (and become `null` in arrays).
/// - Non-finite numbers become `null`.
/// - Nesting deeper than an internal limit is truncated to `null`.
/// - Accessor objects whose keys cannot be listed become `null`.
pub fn materialize(reader: &FieldReader, value: &NativeValue) -> Value {
    materialize_at(reader, value, 0)
}

fn materialize_at(reader: &FieldReader, value: &NativeValue, depth: usize) -> Value {
    if depth > MAX_DEPTH {
        return Value::Null;
    }
    match value {
        NativeValue::Undefined | NativeValue::Null => Value::Null,
        NativeValue::Bool(b) => Value::Bool(*b),
        NativeValue::Number(n) => Number::from_f64(*n).map(Value::Number).unwrap_or(Value::Null),
        NativeValue::String(s) => Value::String(s.clone()),
        NativeValue::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| materialize_at(reader, item, depth + 1))
                .collect(),
        ),
        NativeValue::Object(fields) => {
            let mut out = Map::new();
            for (key, field) in fields {
                if matches!(field, NativeValue::Undefined) {
                    continue;
                }
                out.insert(key.clone(), materialize_at(reader, field, depth + 1));
            }
            Value::Object(out)
        }
        NativeValue::Map(map) => {
            let Ok(keys) = panic::catch_unwind(AssertUnwindSafe(|| map.keys())) else {
                tracing::trace!(type_name = map.type_name(), "accessor keys panicked; materialized as null");
                return Value::Null;
            };
            let mut out = Map::new();
            for key in keys {
                if let Some(field) = reader.read(value, &key).into_option() {
                    out.insert(key, materialize_at(reader, &field, depth + 1));
                }
            }
            Value::Object(out)
        }
    }
}
