//! # Public notifications façade.
//!
//! [`Notifications`] is the single entry point callers use. Every request
//! operation validates caller input first (`INVALID_ARGUMENT`), then goes
//! through the [`NativeBridge`]; listener operations are synchronous and
//! delegate to the [`SubscriptionCoordinator`].
//!
//! ## Example
//! ```rust,no_run
//! use notibridge::{BridgeConfig, MapRegistry, Notifications};
//!
//! # async fn demo() -> Result<(), notibridge::NotificationsError> {
//! let registry = MapRegistry::new("NativeModules");
//! // host: registry.register("LynxNotificationsModule", module);
//!
//! let notifications = Notifications::builder(BridgeConfig::default())
//!     .with_registry(registry)
//!     .build();
//!
//! let subscription = notifications.add_notification_received_listener(|n| {
//!     println!("received {}", n.id);
//! });
//! let token = notifications.register_for_push_notifications(None).await?;
//! println!("token {}", token.data);
//! subscription.remove();
//! # Ok(())
//! # }
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

use super::{builder::NotificationsBuilder, config::BridgeConfig};
use crate::bridge::NativeBridge;
use crate::error::{CanonicalResult, FailureKind, NotificationsError};
use crate::subscribers::{ObserverState, Subscription, SubscriptionCoordinator};
use crate::types::{
    Notification, NotificationRequestInput, NotificationResponse, NotificationTrigger, Permissions, PushProvider,
    PushToken,
};

/// Notifications API backed by a host-registered native module.
pub struct Notifications {
    cfg: BridgeConfig,
    bridge: NativeBridge,
    coordinator: SubscriptionCoordinator,
}

impl Notifications {
    /// Returns a builder for configuring host integrations.
    pub fn builder(cfg: BridgeConfig) -> NotificationsBuilder {
        NotificationsBuilder::new(cfg)
    }

    pub(super) fn new_internal(cfg: BridgeConfig, bridge: NativeBridge, coordinator: SubscriptionCoordinator) -> Self {
        Self {
            cfg,
            bridge,
            coordinator,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.cfg
    }

    /// Current notification permissions, without prompting.
    pub async fn get_permissions(&self) -> CanonicalResult<Permissions> {
        self.bridge.get_permissions().await
    }

    /// Prompts for permissions if the platform still allows it.
    pub async fn request_permissions(&self) -> CanonicalResult<Permissions> {
        self.bridge.request_permissions().await
    }

    /// Device push token for `provider` (defaults to the configured provider).
    pub async fn get_device_push_token(&self, provider: Option<&str>) -> CanonicalResult<PushToken> {
        let provider = self.resolve_provider(provider)?;
        self.bridge.get_push_token(provider).await
    }

    /// Requests permissions and, if granted, returns the device push token.
    ///
    /// Fails with `PERMISSION_DENIED` unless both the status and the flag
    /// report granted.
    pub async fn register_for_push_notifications(&self, provider: Option<&str>) -> CanonicalResult<PushToken> {
        let permissions = self.request_permissions().await?;
        if !permissions.is_granted() {
            tracing::debug!(status = permissions.status.as_str(), "push registration refused");
            return Err(NotificationsError::new(
                FailureKind::PermissionDenied,
                "Push notification permissions were not granted.",
            ));
        }
        self.get_device_push_token(provider).await
    }

    /// Schedules (or presents immediately, when `trigger` is `None`) a notification.
    ///
    /// Returns the native identifier of the scheduled notification.
    pub async fn schedule_notification(&self, request: NotificationRequestInput) -> CanonicalResult<String> {
        validate_request(&request, now_millis())?;
        self.bridge.schedule_notification(&request).await
    }

    pub async fn cancel_scheduled_notification(&self, id: &str) -> CanonicalResult<()> {
        if id.is_empty() {
            return Err(NotificationsError::invalid_argument(
                "Scheduled notification id must be a non-empty string.",
            ));
        }
        self.bridge.cancel_scheduled_notification(id).await
    }

    pub async fn cancel_all_scheduled_notifications(&self) -> CanonicalResult<()> {
        self.bridge.cancel_all_scheduled_notifications().await
    }

    /// The response that launched the app, if any.
    pub async fn get_last_notification_response(&self) -> CanonicalResult<Option<NotificationResponse>> {
        self.bridge.get_last_notification_response().await
    }

    /// Registers a listener for notifications delivered while the app runs.
    ///
    /// Events arriving before the native observer is up are not replayed.
    pub fn add_notification_received_listener<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        self.coordinator.add_received_listener(listener)
    }

    /// Registers a listener for user interactions with notifications.
    pub fn add_notification_response_received_listener<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&NotificationResponse) + Send + Sync + 'static,
    {
        self.coordinator.add_response_listener(listener)
    }

    /// Same as [`Subscription::remove`].
    pub fn remove_notification_subscription(&self, subscription: &Subscription) {
        subscription.remove();
    }

    /// Lifecycle state of the shared native observer.
    pub fn observer_state(&self) -> ObserverState {
        self.coordinator.state()
    }

    fn resolve_provider(&self, provider: Option<&str>) -> CanonicalResult<PushProvider> {
        match provider {
            None => Ok(self.cfg.default_provider),
            Some(name) => name.parse(),
        }
    }
}

fn now_millis() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or(0.0)
}

fn validate_request(request: &NotificationRequestInput, now_ms: f64) -> CanonicalResult<()> {
    if request.content.badge.is_some_and(|badge| !badge.is_finite()) {
        return Err(NotificationsError::invalid_argument(
            "Notification badge must be a finite number when provided.",
        ));
    }

    match request.trigger {
        None => Ok(()),
        Some(NotificationTrigger::Date { date, repeats }) => {
            if !date.is_finite() {
                return Err(NotificationsError::invalid_argument(
                    "Date trigger requires a numeric date (unix milliseconds).",
                ));
            }
            if date <= now_ms {
                return Err(NotificationsError::invalid_argument("Date trigger must be in the future."));
            }
            if repeats {
                return Err(NotificationsError::invalid_argument(
                    "Date trigger does not support repeats=true.",
                ));
            }
            Ok(())
        }
        Some(NotificationTrigger::TimeInterval { seconds, .. }) => {
            if !seconds.is_finite() || seconds <= 0.0 {
                return Err(NotificationsError::invalid_argument(
                    "Time interval trigger requires seconds > 0.",
                ));
            }
            Ok(())
        }
    }
}
