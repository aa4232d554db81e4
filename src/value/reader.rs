//! # Three-valued field lookup.
//!
//! [`FieldReader`] reads a named field from a value of unknown shape and
//! distinguishes **present-but-null** from **absent**: some valid payloads
//! carry `null` for "not applicable", while a missing key is a schema
//! violation.
//!
//! ## Rules
//! - Strategies run in order; the first non-null hit wins.
//! - A getter that throws (or panics) is a miss, never an error.
//! - No hit and at least one strategy saw `null` → `Present(Null)`.
//! - Otherwise → `Absent`.
//!
//! ## Example
//! ```rust
//! use notibridge::{Field, FieldReader, NativeValue};
//!
//! let reader = FieldReader::default();
//! let value = NativeValue::object([("data", NativeValue::Null)]);
//!
//! assert_eq!(reader.read(&value, "data"), Field::Present(NativeValue::Null));
//! assert_eq!(reader.read(&value, "other"), Field::Absent);
//! ```

use std::fmt;
use std::sync::Arc;

use super::strategy::{AccessorStrategy, DirectProperty, Probe, ReadStrategy, CONTAINER_KEYS};
use super::{Accessor, NativeValue};

/// Result of a field lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// The field exists (its value may be [`NativeValue::Null`]).
    Present(NativeValue),
    /// The field does not exist.
    Absent,
}

impl Field {
    /// The field's value, or `None` if absent.
    pub fn into_option(self) -> Option<NativeValue> {
        match self {
            Field::Present(v) => Some(v),
            Field::Absent => None,
        }
    }

    /// The field's value, or [`NativeValue::Undefined`] if absent.
    pub fn into_value(self) -> NativeValue {
        self.into_option().unwrap_or(NativeValue::Undefined)
    }

    /// Non-null value, if any.
    pub fn non_null(self) -> Option<NativeValue> {
        self.into_option().filter(|v| !v.is_nullish())
    }

    #[inline]
    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Field::Present(NativeValue::Null))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Field::Present(v) => v.as_str(),
            Field::Absent => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Field::Present(v) => v.as_bool(),
            Field::Absent => None,
        }
    }
}

/// Ordered chain of [`ReadStrategy`] implementations.
#[derive(Clone)]
pub struct FieldReader {
    strategies: Vec<Arc<dyn ReadStrategy>>,
}

impl FieldReader {
    /// Creates a reader with no strategies (every field is absent).
    pub fn empty() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Appends a strategy at the end of the chain.
    #[must_use]
    pub fn with_strategy(mut self, strategy: impl ReadStrategy) -> Self {
        self.strategies.push(Arc::new(strategy));
        self
    }

    /// Names of the strategies in evaluation order.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Reads `key` from `value`.
    pub fn read(&self, value: &NativeValue, key: &str) -> Field {
        if !value.is_object() {
            return Field::Absent;
        }

        let mut saw_null = false;
        for strategy in &self.strategies {
            match strategy.probe(value, key) {
                Probe::Hit(v) => return Field::Present(v),
                Probe::Null => saw_null = true,
                Probe::Miss => {}
            }
        }

        if saw_null {
            Field::Present(NativeValue::Null)
        } else {
            Field::Absent
        }
    }

    /// Reads a string field; `None` if absent or not a string.
    pub fn read_str(&self, value: &NativeValue, key: &str) -> Option<String> {
        self.read(value, key).as_str().map(str::to_owned)
    }

    /// Reads a boolean field; `None` if absent or not a boolean.
    pub fn read_bool(&self, value: &NativeValue, key: &str) -> Option<bool> {
        self.read(value, key).as_bool()
    }
}

impl Default for FieldReader {
    /// Default chain:
    ///
    /// 1. direct property
    /// 2. `get`
    /// 3. `getMap` (container keys only)
    /// 4. `getString`
    /// 5. `getBoolean`
    /// 6. `getArray`
    fn default() -> Self {
        Self::empty()
            .with_strategy(DirectProperty)
            .with_strategy(AccessorStrategy::new(Accessor::Get))
            .with_strategy(AccessorStrategy::restricted(Accessor::GetMap, CONTAINER_KEYS))
            .with_strategy(AccessorStrategy::new(Accessor::GetString))
            .with_strategy(AccessorStrategy::new(Accessor::GetBoolean))
            .with_strategy(AccessorStrategy::new(Accessor::GetArray))
    }
}

impl fmt::Debug for FieldReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldReader")
            .field("strategies", &self.strategy_names())
            .finish()
    }
}
