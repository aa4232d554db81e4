//! # notibridge
//!
//! **notibridge** is the native-facing core of a notifications SDK.
//!
//! It sits between a typed async API and an opaque, host-registered native
//! module whose calling conventions are not standardized. The host may reply
//! synchronously or later, with one or many positional arguments, and with
//! plain objects or accessor objects. Event payloads may or may not be
//! wrapped in an envelope.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!                     ┌───────────────────────────────┐
//!                     │  Notifications (public API)   │
//!                     └──────┬─────────────────┬──────┘
//!              request ops   │                 │  add/remove listener
//!                            ▼                 ▼
//!                 ┌──────────────────┐  ┌─────────────────────────┐
//!                 │   NativeBridge   │  │ SubscriptionCoordinator │
//!                 └────────┬─────────┘  │ (one shared observer)   │
//!                          │            └────────────┬────────────┘
//!                          │      start/stop         │
//!                          │  ┌──────────────────────┘
//!                          ▼  ▼
//!                 ┌──────────────────┐
//!                 │   DispatchShim   │  constrained caller? → background
//!                 └────────┬─────────┘
//!                          ▼
//!                 ┌──────────────────┐   registries (NativeModules, …)
//!                 │  ModuleLocator   │◄─────────────────────────────
//!                 └────────┬─────────┘
//!                          ▼
//!                 Capability::invoke(method, args, Callback)
//!                          │
//!            ┌─────────────┴──────────────┐
//!            ▼ request reply              ▼ event
//!   ResultNormalizer                 parse_event
//!   (FieldReader)                    (FieldReader)
//!            │                            │
//!            ▼                            ▼
//!   PayloadValidator              fan-out to listeners
//!            │
//!            ▼
//!   T | NotificationsError
//! ```
//!
//! ### Observer lifecycle
//! ```text
//! first listener added ──► Starting ──► Observing
//! last listener removed ─► Stopping ──► NotObserving
//! (one transition in flight at a time; requests join it)
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                              |
//! |-------------------|--------------------------------------------------------------|-------------------------------------------------|
//! | **API**           | Permissions, push tokens, scheduling, listeners.             | [`Notifications`], [`NotificationsBuilder`]     |
//! | **Native boundary** | Host module lookup and the callback convention.            | [`Capability`], [`Callback`], [`RegistrySource`] |
//! | **Values**        | Unknown-shape values and three-valued field reads.           | [`NativeValue`], [`MapLike`], [`FieldReader`]   |
//! | **Events**        | Closed event set and total envelope parser.                  | [`NotificationEvent`], [`parse_event`]          |
//! | **Subscriptions** | Reference-counted listeners over one native observer.        | [`Subscription`], [`ObserverState`]             |
//! | **Dispatch**      | Off-thread execution with direct fallback.                   | [`Dispatcher`], [`BackgroundDispatcher`]        |
//! | **Errors**        | One typed failure with a closed kind set.                    | [`NotificationsError`], [`FailureKind`]         |
//! | **Configuration** | Module names and diagnostics settings.                       | [`BridgeConfig`]                                |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use notibridge::{BridgeConfig, Callback, Capability, MapRegistry, NativeValue, Notifications};
//!
//! struct HostModule;
//!
//! impl Capability for HostModule {
//!     fn has_method(&self, method: &str) -> bool {
//!         method == "getPermissions"
//!     }
//!
//!     fn invoke(&self, _method: &str, _args: Vec<NativeValue>, callback: Callback) -> Result<(), String> {
//!         // (error, data) style reply
//!         callback.invoke(vec![
//!             NativeValue::Null,
//!             NativeValue::object([
//!                 ("status", NativeValue::from("granted")),
//!                 ("granted", NativeValue::from(true)),
//!                 ("canAskAgain", NativeValue::from(false)),
//!             ]),
//!         ]);
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), notibridge::NotificationsError> {
//!     let registry = MapRegistry::new("NativeModules");
//!     registry.register("LynxNotificationsModule", Arc::new(HostModule));
//!
//!     let notifications = Notifications::builder(BridgeConfig::default())
//!         .with_registry(registry)
//!         .build();
//!
//!     let permissions = notifications.get_permissions().await?;
//!     assert!(permissions.is_granted());
//!     Ok(())
//! }
//! ```
mod bridge;
mod core;
mod dispatch;
mod error;
mod events;
mod subscribers;
mod types;
mod unwind;
mod value;

#[cfg(test)]
mod testkit;

// ---- Public re-exports ----

pub use bridge::{
    Callback, Capability, CapabilityHandle, MapRegistry, ModuleLocator, NativeBridge, NativeObserver, PayloadValidator,
    RegistrySource, ResultNormalizer,
};
pub use core::{BridgeConfig, Notifications, NotificationsBuilder};
pub use dispatch::{BackgroundDispatcher, DispatchShim, Dispatcher, Inline, Job};
pub use error::{CanonicalResult, DispatchError, FailureKind, NotificationsError};
pub use events::{parse_event, NotificationEvent};
pub use subscribers::{
    EventSink, Listener, ListenerKind, ObserverDriver, ObserverState, Subscription, SubscriptionCoordinator,
};
pub use types::{
    Notification, NotificationContentInput, NotificationRequestInput, NotificationResponse, NotificationSound,
    NotificationTrigger, PermissionStatus, Permissions, PushProvider, PushToken, PushTokenKind,
};
pub use value::{
    describe, materialize, Accessor, AccessorFault, AccessorStrategy, DirectProperty, Field, FieldReader, MapLike,
    NativeValue, Probe, ReadStrategy, CONTAINER_KEYS,
};
