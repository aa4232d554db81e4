//! Field lookup strategies.
//!
//! Each [`ReadStrategy`] knows one host convention for reaching a named
//! field. The [`FieldReader`](super::FieldReader) runs them in order.

use std::panic::{self, AssertUnwindSafe};

use super::{Accessor, AccessorFault, NativeValue};

/// Keys whose accessor objects may return `null` from the generic getter
/// while `getMap` still yields a materialized nested value.
pub const CONTAINER_KEYS: &[&str] = &[
    "data",
    "error",
    "notification",
    "response",
    "token",
    "event",
    "request",
    "content",
    "trigger",
];

/// Outcome of a single strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum Probe {
    /// Non-null value found.
    Hit(NativeValue),
    /// The field exists but holds `null`.
    Null,
    /// Not reachable through this strategy.
    Miss,
}

impl Probe {
    fn from_value(value: Option<NativeValue>) -> Self {
        match value {
            None | Some(NativeValue::Undefined) => Probe::Miss,
            Some(NativeValue::Null) => Probe::Null,
            Some(v) => Probe::Hit(v),
        }
    }
}

/// One way of reading a field out of a value.
pub trait ReadStrategy: Send + Sync + 'static {
    /// Short name used in trace logs.
    fn name(&self) -> &'static str;

    /// Attempts the lookup. Must not panic for well-behaved hosts.
    fn probe(&self, value: &NativeValue, key: &str) -> Probe;
}

/// Plain property on an object, or own property of an accessor object.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectProperty;

impl ReadStrategy for DirectProperty {
    fn name(&self) -> &'static str {
        "property"
    }

    fn probe(&self, value: &NativeValue, key: &str) -> Probe {
        match value {
            NativeValue::Object(fields) => Probe::from_value(fields.get(key).cloned()),
            NativeValue::Map(map) => {
                let found = panic::catch_unwind(AssertUnwindSafe(|| map.property(key)));
                Probe::from_value(found.unwrap_or(None))
            }
            _ => Probe::Miss,
        }
    }
}

/// Getter method on an accessor object, optionally limited to a key set.
#[derive(Debug, Clone, Copy)]
pub struct AccessorStrategy {
    accessor: Accessor,
    only: Option<&'static [&'static str]>,
}

impl AccessorStrategy {
    /// Applies the getter to every key.
    pub const fn new(accessor: Accessor) -> Self {
        Self {
            accessor,
            only: None,
        }
    }

    /// Applies the getter only to the given keys.
    pub const fn restricted(accessor: Accessor, keys: &'static [&'static str]) -> Self {
        Self {
            accessor,
            only: Some(keys),
        }
    }
}

impl ReadStrategy for AccessorStrategy {
    fn name(&self) -> &'static str {
        self.accessor.method_name()
    }

    fn probe(&self, value: &NativeValue, key: &str) -> Probe {
        let NativeValue::Map(map) = value else {
            return Probe::Miss;
        };
        if let Some(keys) = self.only {
            if !keys.contains(&key) {
                return Probe::Miss;
            }
        }

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| map.call(self.accessor, key)))
            .unwrap_or_else(|_| Err(AccessorFault::Threw("accessor panicked".to_string())));

        match outcome {
            Ok(v) => Probe::from_value(Some(v)),
            Err(AccessorFault::Unsupported) => Probe::Miss,
            Err(AccessorFault::Threw(reason)) => {
                tracing::trace!(
                    accessor = self.accessor.method_name(),
                    key,
                    reason = %reason,
                    "accessor threw; treating as miss"
                );
                Probe::Miss
            }
        }
    }
}
