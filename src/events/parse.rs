//! # Event envelope parser.
//!
//! ```text
//! {type, <sub-field>}               ─┐
//! {event: {type, <sub-field>}}      ─┴─► NotificationEvent | None
//! ```
//!
//! ## Rules
//! - `type` is read from the payload itself first, then from a nested `event`.
//! - The sub-field named by the type must be present, non-null and
//!   deserializable; otherwise the whole event is dropped.
//! - Unknown types and payloads without a type are dropped.
//! - Total: a panic raised while reading host objects drops the event.

use std::panic::{self, AssertUnwindSafe};

use serde::de::DeserializeOwned;

use super::event::{NotificationEvent, NOTIFICATION_RECEIVED, NOTIFICATION_RESPONSE, TOKEN_REFRESHED};
use crate::unwind::panic_message;
use crate::value::{materialize, FieldReader, NativeValue};

/// Maps an arbitrary native payload to a known event, or `None`.
pub fn parse_event(reader: &FieldReader, payload: &NativeValue) -> Option<NotificationEvent> {
    match panic::catch_unwind(AssertUnwindSafe(|| parse_envelope(reader, payload))) {
        Ok(event) => event,
        Err(payload) => {
            tracing::debug!(panic = %panic_message(&*payload), "native event reader panicked; event dropped");
            None
        }
    }
}

fn parse_envelope(reader: &FieldReader, payload: &NativeValue) -> Option<NotificationEvent> {
    let envelope = locate_envelope(reader, payload)?;
    let event_type = reader.read_str(&envelope, "type")?;

    match event_type.as_str() {
        NOTIFICATION_RECEIVED => sub_field(reader, &envelope, "notification").map(NotificationEvent::Received),
        NOTIFICATION_RESPONSE => sub_field(reader, &envelope, "response").map(NotificationEvent::Response),
        TOKEN_REFRESHED => sub_field(reader, &envelope, "token").map(NotificationEvent::TokenRefreshed),
        _ => None,
    }
}

fn locate_envelope(reader: &FieldReader, payload: &NativeValue) -> Option<NativeValue> {
    if reader.read_str(payload, "type").is_some() {
        return Some(payload.clone());
    }
    reader.read(payload, "event").non_null()
}

fn sub_field<T: DeserializeOwned>(reader: &FieldReader, envelope: &NativeValue, key: &str) -> Option<T> {
    let value = reader.read(envelope, key).non_null()?;
    serde_json::from_value(materialize(reader, &value)).ok()
}
