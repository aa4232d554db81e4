//! Dynamic values exchanged with the native side.
//!
//! Native replies arrive with no guaranteed shape. They may be plain
//! objects, or accessor objects ("map-like") that only expose their fields
//! through named getter methods.
//!
//! ## Contents
//! - [`NativeValue`] the value model (plain variants plus [`NativeValue::Map`])
//! - [`MapLike`] the accessor-object convention
//! - [`FieldReader`], [`Field`] three-valued field lookup over both shapes
//! - [`describe`] structural description used in diagnostics
//!
//! ## Reading flow
//! ```text
//! FieldReader::read(value, key)
//!     ├─► DirectProperty          (plain field / own property)
//!     ├─► Accessor(Get)           (generic getter)
//!     ├─► Accessor(GetMap)        (container keys only)
//!     ├─► Accessor(GetString)
//!     ├─► Accessor(GetBoolean)
//!     └─► Accessor(GetArray)
//! first Hit wins; any Null seen → Present(Null); otherwise Absent
//! ```

mod describe;
mod json;
mod reader;
mod strategy;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

pub use describe::describe;
pub use json::materialize;
pub use reader::{Field, FieldReader};
pub use strategy::{AccessorStrategy, DirectProperty, Probe, ReadStrategy, CONTAINER_KEYS};

/// Named getter families exposed by accessor objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accessor {
    /// Generic `get(key)`.
    Get,
    /// `getMap(key)`: materialized nested object.
    GetMap,
    /// `getString(key)`.
    GetString,
    /// `getBoolean(key)`.
    GetBoolean,
    /// `getArray(key)`.
    GetArray,
}

impl Accessor {
    /// Host method name of this getter.
    pub fn method_name(&self) -> &'static str {
        match self {
            Accessor::Get => "get",
            Accessor::GetMap => "getMap",
            Accessor::GetString => "getString",
            Accessor::GetBoolean => "getBoolean",
            Accessor::GetArray => "getArray",
        }
    }
}

/// Why an accessor call produced no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessorFault {
    /// The object does not expose this getter at all.
    Unsupported,
    /// The getter exists but raised (wrong type, missing key, host error).
    Threw(String),
}

/// # Accessor-object convention.
///
/// Implemented by host adapters for objects that expose fields through
/// getter methods instead of (or in addition to) plain properties.
///
/// ### Implementation requirements
/// - `call` must not panic; report failures as [`AccessorFault::Threw`].
///   Panics are still contained by the normalizer, but cost a failed reply.
/// - Return [`NativeValue::Null`] for a key that exists with no value.
pub trait MapLike: Send + Sync + 'static {
    /// Constructor-like name used in diagnostics.
    fn type_name(&self) -> &str {
        "MapLike"
    }

    /// Enumerable keys.
    fn keys(&self) -> Vec<String>;

    /// Direct (own) property lookup; `None` when the property does not exist.
    fn property(&self, _key: &str) -> Option<NativeValue> {
        None
    }

    /// Invokes a named getter.
    fn call(&self, accessor: Accessor, key: &str) -> Result<NativeValue, AccessorFault>;
}

/// A value of unknown shape received from, or sent to, the native side.
#[derive(Clone, Default)]
pub enum NativeValue {
    /// Genuinely absent (no argument / missing property).
    #[default]
    Undefined,
    /// Explicit null.
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<NativeValue>),
    /// Plain object.
    Object(BTreeMap<String, NativeValue>),
    /// Accessor object.
    Map(Arc<dyn MapLike>),
}

impl NativeValue {
    /// Wraps an accessor object.
    pub fn map(inner: impl MapLike) -> Self {
        NativeValue::Map(Arc::new(inner))
    }

    /// Builds a plain object from key/value pairs.
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, NativeValue)>,
    {
        NativeValue::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// `true` for [`NativeValue::Null`] and [`NativeValue::Undefined`].
    #[inline]
    pub fn is_nullish(&self) -> bool {
        matches!(self, NativeValue::Null | NativeValue::Undefined)
    }

    /// `true` for plain objects and accessor objects.
    #[inline]
    pub fn is_object(&self) -> bool {
        matches!(self, NativeValue::Object(_) | NativeValue::Map(_))
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            NativeValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            NativeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Short kind name (`"object"`, `"map"`, `"string"`, ...).
    pub fn kind_name(&self) -> &'static str {
        match self {
            NativeValue::Undefined => "undefined",
            NativeValue::Null => "null",
            NativeValue::Bool(_) => "boolean",
            NativeValue::Number(_) => "number",
            NativeValue::String(_) => "string",
            NativeValue::Array(_) => "array",
            NativeValue::Object(_) => "object",
            NativeValue::Map(_) => "map",
        }
    }
}

impl fmt::Debug for NativeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeValue::Undefined => f.write_str("Undefined"),
            NativeValue::Null => f.write_str("Null"),
            NativeValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            NativeValue::Number(n) => f.debug_tuple("Number").field(n).finish(),
            NativeValue::String(s) => f.debug_tuple("String").field(s).finish(),
            NativeValue::Array(items) => f.debug_tuple("Array").field(items).finish(),
            NativeValue::Object(fields) => f.debug_tuple("Object").field(fields).finish(),
            NativeValue::Map(m) => write!(f, "Map({})", m.type_name()),
        }
    }
}

/// Accessor objects compare by identity.
impl PartialEq for NativeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NativeValue::Undefined, NativeValue::Undefined) => true,
            (NativeValue::Null, NativeValue::Null) => true,
            (NativeValue::Bool(a), NativeValue::Bool(b)) => a == b,
            (NativeValue::Number(a), NativeValue::Number(b)) => a == b,
            (NativeValue::String(a), NativeValue::String(b)) => a == b,
            (NativeValue::Array(a), NativeValue::Array(b)) => a == b,
            (NativeValue::Object(a), NativeValue::Object(b)) => a == b,
            (NativeValue::Map(a), NativeValue::Map(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for NativeValue {
    fn from(b: bool) -> Self {
        NativeValue::Bool(b)
    }
}

impl From<f64> for NativeValue {
    fn from(n: f64) -> Self {
        NativeValue::Number(n)
    }
}

impl From<&str> for NativeValue {
    fn from(s: &str) -> Self {
        NativeValue::String(s.to_owned())
    }
}

impl From<String> for NativeValue {
    fn from(s: String) -> Self {
        NativeValue::String(s)
    }
}

impl From<Vec<NativeValue>> for NativeValue {
    fn from(items: Vec<NativeValue>) -> Self {
        NativeValue::Array(items)
    }
}
