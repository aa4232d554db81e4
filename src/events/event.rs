//! # Events delivered by the native observer.
//!
//! The set is closed: anything the parser cannot map to one of these
//! variants is dropped before it reaches listeners.

use crate::types::{Notification, NotificationResponse, PushToken};

/// Wire value of `type` for [`NotificationEvent::Received`].
pub(crate) const NOTIFICATION_RECEIVED: &str = "notification_received";
/// Wire value of `type` for [`NotificationEvent::Response`].
pub(crate) const NOTIFICATION_RESPONSE: &str = "notification_response";
/// Wire value of `type` for [`NotificationEvent::TokenRefreshed`].
pub(crate) const TOKEN_REFRESHED: &str = "token_refreshed";

/// A recognized native event.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEvent {
    /// A notification was delivered while the app was running.
    ///
    /// Payload sub-field: `notification`.
    Received(Notification),

    /// The user interacted with a notification.
    ///
    /// Payload sub-field: `response`.
    Response(NotificationResponse),

    /// The platform rotated the push token.
    ///
    /// Payload sub-field: `token`.
    TokenRefreshed(PushToken),
}

impl NotificationEvent {
    /// Returns the wire `type` of this event.
    pub fn type_name(&self) -> &'static str {
        match self {
            NotificationEvent::Received(_) => NOTIFICATION_RECEIVED,
            NotificationEvent::Response(_) => NOTIFICATION_RESPONSE,
            NotificationEvent::TokenRefreshed(_) => TOKEN_REFRESHED,
        }
    }
}
