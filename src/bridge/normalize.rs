//! # Result normalizer.
//!
//! Turns the raw positional arguments of a native callback into one
//! canonical success value or a typed [`NotificationsError`].
//!
//! ## Argument disambiguation
//! ```text
//! []                         → Undefined
//! [x]                        → x
//! [.., {ok: bool, ..}, ..]   → the tagged record
//! [.., {…}, ..]              → first non-null object
//! [null, x, ..]              → x
//! otherwise                  → last argument
//! ```
//!
//! ## Canonicalization
//! ```text
//! {ok: true,  data}          → Ok(data)        (map accessor rescue when data is null)
//! {ok: false, error}         → Err(code → FailureKind, message, native_kind = code)
//! anything without bool ok   → Ok(value)
//! panic while normalizing    → Err(NATIVE_FAILURE + structural description)
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::{CanonicalResult, NotificationsError};
use crate::unwind::panic_message;
use crate::value::{describe, Accessor, Field, FieldReader, NativeValue};

const UNKNOWN_ERROR_MESSAGE: &str = "Unknown notifications error";

/// Normalizes native replies using a shared [`FieldReader`].
#[derive(Clone, Debug)]
pub struct ResultNormalizer {
    reader: Arc<FieldReader>,
    key_limit: usize,
}

impl ResultNormalizer {
    pub fn new(reader: Arc<FieldReader>, key_limit: usize) -> Self {
        Self {
            reader,
            key_limit: key_limit.max(1),
        }
    }

    pub fn reader(&self) -> &FieldReader {
        &self.reader
    }

    /// Structural description using the configured key limit.
    pub fn describe(&self, value: &NativeValue) -> String {
        describe(value, self.key_limit)
    }

    /// Picks the meaningful payload out of a callback's positional arguments.
    pub fn select_payload(&self, mut args: Vec<NativeValue>) -> NativeValue {
        match args.len() {
            0 => return NativeValue::Undefined,
            1 => return args.remove(0),
            _ => {}
        }

        if let Some(i) = args.iter().position(|a| self.is_tagged(a)) {
            return args.swap_remove(i);
        }
        if let Some(i) = args.iter().position(NativeValue::is_object) {
            return args.swap_remove(i);
        }
        if args[0].is_nullish() {
            return args.swap_remove(1);
        }
        args.pop().unwrap_or_default()
    }

    /// Converts a selected payload into a canonical result.
    pub fn canonicalize(&self, value: NativeValue) -> CanonicalResult<NativeValue> {
        match self.reader.read(&value, "ok") {
            Field::Present(NativeValue::Bool(true)) => Ok(self.success_data(&value)),
            Field::Present(NativeValue::Bool(false)) => Err(self.failure_from(&value)),
            _ => Ok(value),
        }
    }

    /// [`select_payload`](Self::select_payload) then [`canonicalize`](Self::canonicalize),
    /// containing any panic raised by host accessors along the way.
    pub fn normalize(&self, args: Vec<NativeValue>) -> CanonicalResult<NativeValue> {
        let received = NativeValue::Array(args.clone());
        let selected = match panic::catch_unwind(AssertUnwindSafe(|| self.select_payload(args))) {
            Ok(v) => v,
            Err(payload) => return Err(self.malformed(&received, &panic_message(&*payload))),
        };

        let attempt = selected.clone();
        match panic::catch_unwind(AssertUnwindSafe(|| self.canonicalize(attempt))) {
            Ok(result) => result,
            Err(payload) => Err(self.malformed(&selected, &panic_message(&*payload))),
        }
    }

    fn is_tagged(&self, value: &NativeValue) -> bool {
        self.reader.read_bool(value, "ok").is_some()
    }

    fn success_data(&self, record: &NativeValue) -> NativeValue {
        match self.reader.read(record, "data") {
            Field::Present(NativeValue::Null) => {
                self.rescue_nested_data(record).unwrap_or(NativeValue::Null)
            }
            field => field.into_value(),
        }
    }

    // Accessor records may report `data` as null at the top level while a
    // nested map getter still yields it. Whether any current host relies on
    // this is unverified; it is kept so custom reader chains without a
    // `getMap` step behave the same as the default one.
    fn rescue_nested_data(&self, record: &NativeValue) -> Option<NativeValue> {
        let NativeValue::Map(map) = record else {
            return None;
        };
        map.call(Accessor::GetMap, "data")
            .ok()
            .filter(|v| !v.is_nullish())
    }

    fn failure_from(&self, record: &NativeValue) -> NotificationsError {
        let error = self.reader.read(record, "error").into_value();
        if let NativeValue::String(message) = &error {
            return NotificationsError::from_native(None, message.clone());
        }

        let code = self.reader.read_str(&error, "code");
        let message = self
            .reader
            .read_str(&error, "message")
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string());
        NotificationsError::from_native(code.as_deref(), message)
    }

    fn malformed(&self, value: &NativeValue, reason: &str) -> NotificationsError {
        NotificationsError::native(format!(
            "Failed to normalize native reply ({reason}); received {}",
            self.describe(value)
        ))
    }
}

impl Default for ResultNormalizer {
    fn default() -> Self {
        Self::new(Arc::new(FieldReader::default()), 8)
    }
}
