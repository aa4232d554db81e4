//! # Typed payload validators.
//!
//! One validator per operation result. Each either returns the strongly typed
//! value or fails with `NATIVE_FAILURE` describing what was received.
//! Validation is all-or-nothing: no field is ever defaulted.

use std::panic::{self, AssertUnwindSafe};

use serde::de::DeserializeOwned;

use super::normalize::ResultNormalizer;
use crate::error::{CanonicalResult, NotificationsError};
use crate::types::{NotificationResponse, PermissionStatus, Permissions, PushToken, PushTokenKind};
use crate::unwind::panic_message;
use crate::value::{materialize, NativeValue};

/// Validators bound to the normalizer's reader and description settings.
pub struct PayloadValidator<'a> {
    normalizer: &'a ResultNormalizer,
}

impl<'a> PayloadValidator<'a> {
    pub fn new(normalizer: &'a ResultNormalizer) -> Self {
        Self { normalizer }
    }

    /// `status ∈ {granted, denied, undetermined}`, `granted: bool`, `canAskAgain: bool`.
    pub fn permissions(&self, method: &str, value: &NativeValue) -> CanonicalResult<Permissions> {
        self.guarded(method, "permissions", value, || {
            let reader = self.normalizer.reader();
            let status = reader
                .read(value, "status")
                .as_str()
                .and_then(|s| s.parse::<PermissionStatus>().ok());
            let granted = reader.read_bool(value, "granted");
            let can_ask_again = reader.read_bool(value, "canAskAgain");

            match (status, granted, can_ask_again) {
                (Some(status), Some(granted), Some(can_ask_again)) => Some(Permissions {
                    status,
                    granted,
                    can_ask_again,
                }),
                _ => None,
            }
        })
    }

    /// `type ∈ {fcm, native}`, `data` a non-empty string.
    pub fn push_token(&self, method: &str, value: &NativeValue) -> CanonicalResult<PushToken> {
        self.guarded(method, "push token", value, || {
            let reader = self.normalizer.reader();
            let kind = reader
                .read(value, "type")
                .as_str()
                .and_then(|s| s.parse::<PushTokenKind>().ok());
            let data = reader.read_str(value, "data").filter(|d| !d.is_empty());
            Some(PushToken { kind: kind?, data: data? })
        })
    }

    /// A bare string, or an object exposing a string `id`.
    pub fn schedule_id(&self, method: &str, value: &NativeValue) -> CanonicalResult<String> {
        self.guarded(method, "identifier", value, || match value {
            NativeValue::String(id) => Some(id.clone()),
            _ => self.normalizer.reader().read_str(value, "id"),
        })
    }

    /// `null` → `None`; otherwise a complete notification response.
    pub fn optional_response(
        &self,
        method: &str,
        value: &NativeValue,
    ) -> CanonicalResult<Option<NotificationResponse>> {
        if value.is_nullish() {
            return Ok(None);
        }
        self.guarded(method, "notification response", value, || self.typed(value))
            .map(Some)
    }

    /// Materializes `value` and deserializes it into `T`.
    ///
    /// `None` when the value does not deserialize or reading it panicked.
    pub fn typed<T: DeserializeOwned>(&self, value: &NativeValue) -> Option<T> {
        panic::catch_unwind(AssertUnwindSafe(|| {
            serde_json::from_value(materialize(self.normalizer.reader(), value)).ok()
        }))
        .unwrap_or(None)
    }

    // Runs `check` with host panics contained; `None` and panics both
    // surface as an invalid-payload failure.
    fn guarded<T>(
        &self,
        method: &str,
        what: &str,
        value: &NativeValue,
        check: impl FnOnce() -> Option<T>,
    ) -> CanonicalResult<T> {
        match panic::catch_unwind(AssertUnwindSafe(check)) {
            Ok(Some(checked)) => Ok(checked),
            Ok(None) => Err(self.invalid(method, what, value, None)),
            Err(payload) => Err(self.invalid(method, what, value, Some(panic_message(&*payload)))),
        }
    }

    fn invalid(&self, method: &str, what: &str, value: &NativeValue, panicked: Option<String>) -> NotificationsError {
        let received = self.normalizer.describe(value);
        NotificationsError::native(match panicked {
            None => format!("Native {method} returned an invalid {what} payload; received {received}"),
            Some(reason) => format!(
                "Native {method} returned an invalid {what} payload; reading it panicked ({reason}); received {received}"
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::FailureKind;
    use std::sync::Arc;

    use crate::testkit::{sample_response, FakeMap};
    use crate::value::{FieldReader, Probe, ReadStrategy};

    struct Exploding;

    impl ReadStrategy for Exploding {
        fn name(&self) -> &'static str {
            "exploding"
        }

        fn probe(&self, _value: &NativeValue, _key: &str) -> Probe {
            panic!("reader exploded")
        }
    }

    fn assert_contained<T: std::fmt::Debug>(result: CanonicalResult<T>) {
        let err = result.unwrap_err();
        assert_eq!(err.kind, FailureKind::NativeFailure);
        assert!(err.message.contains("reader exploded"), "{}", err.message);
    }

    fn check<T>(f: impl FnOnce(&PayloadValidator<'_>) -> T) -> T {
        let normalizer = ResultNormalizer::default();
        let validator = PayloadValidator::new(&normalizer);
        f(&validator)
    }

    #[test]
    fn permissions_require_all_three_fields() {
        let complete = NativeValue::from(json!({ "status": "denied", "granted": false, "canAskAgain": true }));
        let perms = check(|v| v.permissions("getPermissions", &complete)).unwrap();
        assert_eq!(perms.status, PermissionStatus::Denied);
        assert!(perms.can_ask_again);

        let partial = NativeValue::from(json!({ "status": "granted", "granted": true }));
        let err = check(|v| v.permissions("getPermissions", &partial)).unwrap_err();
        assert_eq!(err.kind, FailureKind::NativeFailure);
        assert!(err.message.contains("keys=[granted, status]"), "{}", err.message);
    }

    #[test]
    fn permissions_reject_unknown_status() {
        let value = NativeValue::from(json!({ "status": "provisional", "granted": true, "canAskAgain": true }));
        assert!(check(|v| v.permissions("getPermissions", &value)).is_err());
    }

    #[test]
    fn permissions_read_from_accessor_objects() {
        let map = FakeMap::new("ReadableNativeMap")
            .with_string("status", "granted")
            .with_boolean("granted", true)
            .with_boolean("canAskAgain", false);
        let perms = check(|v| v.permissions("requestPermissions", &NativeValue::map(map))).unwrap();
        assert!(perms.is_granted());
        assert!(!perms.can_ask_again);
    }

    #[test]
    fn push_token_rules() {
        let good = NativeValue::from(json!({ "type": "native", "data": "abc" }));
        assert_eq!(check(|v| v.push_token("getPushToken", &good)).unwrap().kind, PushTokenKind::Native);

        for bad in [
            json!({ "type": "apns", "data": "abc" }),
            json!({ "type": "fcm", "data": "" }),
            json!({ "type": "fcm" }),
        ] {
            assert!(check(|v| v.push_token("getPushToken", &NativeValue::from(bad))).is_err());
        }
    }

    #[test]
    fn schedule_id_accepts_string_or_object() {
        assert_eq!(
            check(|v| v.schedule_id("scheduleNotification", &NativeValue::from("n-1"))).unwrap(),
            "n-1"
        );
        let object = NativeValue::from(json!({ "id": "n-2" }));
        assert_eq!(check(|v| v.schedule_id("scheduleNotification", &object)).unwrap(), "n-2");

        let err = check(|v| v.schedule_id("scheduleNotification", &NativeValue::from(json!({ "id": 4 }))))
            .unwrap_err();
        assert_eq!(
            err.message,
            "Native scheduleNotification returned an invalid identifier payload; received object(Object) keys=[id]"
        );
    }

    #[test]
    fn optional_response_handles_null_and_full_payloads() {
        assert_eq!(
            check(|v| v.optional_response("getLastNotificationResponse", &NativeValue::Null)).unwrap(),
            None
        );

        let value = NativeValue::from(sample_response());
        let response = check(|v| v.optional_response("getLastNotificationResponse", &value))
            .unwrap()
            .unwrap();
        assert_eq!(response.action_identifier, "default");

        let broken = NativeValue::from(json!({ "actionIdentifier": "default" }));
        assert!(check(|v| v.optional_response("getLastNotificationResponse", &broken)).is_err());
    }

    #[test]
    fn panicking_reader_fails_every_validator_as_native_failure() {
        let normalizer = ResultNormalizer::new(Arc::new(FieldReader::empty().with_strategy(Exploding)), 8);
        let validator = PayloadValidator::new(&normalizer);
        let value = NativeValue::from(json!({ "status": "granted", "id": "n-1" }));

        assert_contained(validator.permissions("getPermissions", &value));
        assert_contained(validator.push_token("getPushToken", &value));
        assert_contained(validator.schedule_id("scheduleNotification", &value));
        assert_eq!(validator.typed::<NotificationResponse>(&value), None);

        let err = validator
            .optional_response("getLastNotificationResponse", &value)
            .unwrap_err();
        assert_eq!(err.kind, FailureKind::NativeFailure);
    }

    #[test]
    fn unlistable_response_object_is_native_failure() {
        let value = NativeValue::map(FakeMap::new("ReadableNativeMap").panicking_keys());
        let err = check(|v| v.optional_response("getLastNotificationResponse", &value)).unwrap_err();

        assert_eq!(err.kind, FailureKind::NativeFailure);
        assert_eq!(
            err.message,
            "Native getLastNotificationResponse returned an invalid notification response payload; \
             received map(ReadableNativeMap) keys=<unavailable>"
        );
    }
}
