//! Typed payloads exchanged with the native module.
//!
//! All types use camelCase field names on the wire, matching what hosts
//! send and expect.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::NotificationsError;

/// Permission state reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

impl PermissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionStatus::Granted => "granted",
            PermissionStatus::Denied => "denied",
            PermissionStatus::Undetermined => "undetermined",
        }
    }
}

impl FromStr for PermissionStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "granted" => Ok(PermissionStatus::Granted),
            "denied" => Ok(PermissionStatus::Denied),
            "undetermined" => Ok(PermissionStatus::Undetermined),
            _ => Err(()),
        }
    }
}

/// Notification permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    pub status: PermissionStatus,
    pub granted: bool,
    pub can_ask_again: bool,
}

impl Permissions {
    /// `true` only when both the status and the flag agree on granted.
    pub fn is_granted(&self) -> bool {
        self.granted && self.status == PermissionStatus::Granted
    }
}

/// Push providers callers may request a token from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushProvider {
    #[default]
    Fcm,
}

impl PushProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            PushProvider::Fcm => "fcm",
        }
    }
}

impl FromStr for PushProvider {
    type Err = NotificationsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fcm" => Ok(PushProvider::Fcm),
            other => Err(NotificationsError::invalid_argument(format!(
                "Unsupported push provider \"{other}\"."
            ))),
        }
    }
}

impl fmt::Display for PushProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Origin of a push token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushTokenKind {
    Fcm,
    Native,
}

impl FromStr for PushTokenKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fcm" => Ok(PushTokenKind::Fcm),
            "native" => Ok(PushTokenKind::Native),
            _ => Err(()),
        }
    }
}

/// Device push token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushToken {
    #[serde(rename = "type")]
    pub kind: PushTokenKind,
    pub data: String,
}

/// Sound to play with a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationSound {
    Default,
}

/// User-visible content of a notification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationContentInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound: Option<NotificationSound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<f64>,
}

/// When a scheduled notification fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NotificationTrigger {
    /// Fire once at `date` (unix milliseconds).
    #[serde(rename = "date")]
    Date {
        date: f64,
        #[serde(default)]
        repeats: bool,
    },
    /// Fire after `seconds`, optionally repeating.
    #[serde(rename = "timeInterval")]
    TimeInterval {
        seconds: f64,
        #[serde(default)]
        repeats: bool,
    },
}

/// A request to present or schedule a notification. `trigger: None` means immediately.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationRequestInput {
    pub content: NotificationContentInput,
    #[serde(default)]
    pub trigger: Option<NotificationTrigger>,
}

/// A delivered notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    /// Delivery time (unix milliseconds).
    pub date: f64,
    pub request: NotificationRequestInput,
}

/// The user's interaction with a notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub notification: Notification,
    pub action_identifier: String,
}
