//! # Native capability boundary.
//!
//! A [`Capability`] is the opaque host object exposing notification
//! operations. Every method uses the `(...args, callback)` convention: the
//! host calls [`Callback`] with one or more positional arguments whenever it
//! has a reply, synchronously or later, from any thread.
//!
//! ## Rules
//! - `invoke` returning `Err` means the host threw synchronously.
//! - Request/response methods settle on the first callback invocation.
//! - `startObservingEvents` keeps its callback and invokes it once per event.
//! - Dropping every clone of a request callback without calling it settles
//!   the call as a native failure.

use std::fmt;
use std::sync::Arc;

use crate::value::NativeValue;

pub(crate) const GET_PERMISSIONS: &str = "getPermissions";
pub(crate) const REQUEST_PERMISSIONS: &str = "requestPermissions";
pub(crate) const GET_PUSH_TOKEN: &str = "getPushToken";
pub(crate) const SCHEDULE_NOTIFICATION: &str = "scheduleNotification";
pub(crate) const CANCEL_SCHEDULED: &str = "cancelScheduledNotification";
pub(crate) const CANCEL_ALL_SCHEDULED: &str = "cancelAllScheduledNotifications";
pub(crate) const GET_LAST_RESPONSE: &str = "getLastNotificationResponse";
pub(crate) const START_OBSERVING: &str = "startObservingEvents";
pub(crate) const STOP_OBSERVING: &str = "stopObservingEvents";

/// Shared handle to a host-registered capability object.
///
/// Looked up fresh for every operation; never cached beyond one call.
pub type CapabilityHandle = Arc<dyn Capability>;

/// Host-registered notifications module.
pub trait Capability: Send + Sync + 'static {
    /// Constructor-like name used in diagnostics.
    fn type_name(&self) -> &str {
        "Capability"
    }

    /// Whether the object exposes a callable method named `method`.
    fn has_method(&self, method: &str) -> bool;

    /// Calls `method` with positional `args`; the reply arrives through `callback`.
    fn invoke(&self, method: &str, args: Vec<NativeValue>, callback: Callback) -> Result<(), String>;
}

/// Reply channel handed to the host with every call.
///
/// Cheap to clone; all clones feed the same receiver.
#[derive(Clone)]
pub struct Callback {
    inner: Arc<dyn Fn(Vec<NativeValue>) + Send + Sync>,
}

impl Callback {
    pub fn new(f: impl Fn(Vec<NativeValue>) + Send + Sync + 'static) -> Self {
        Self { inner: Arc::new(f) }
    }

    /// Delivers the full positional argument list.
    pub fn invoke(&self, args: Vec<NativeValue>) {
        (self.inner)(args);
    }

    /// Delivers a single argument.
    pub fn reply(&self, value: NativeValue) {
        self.invoke(vec![value]);
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback")
    }
}
