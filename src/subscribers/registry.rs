//! Listener registry: two keyed maps, one per listener kind.
//!
//! Mutated only under the coordinator's lock; dispatch works on snapshots
//! so a listener added or removed mid-dispatch only affects later events.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::types::{Notification, NotificationResponse};

/// Callback registered for one listener kind.
pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Which event a listener receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    /// Notifications delivered while the app runs.
    Received,
    /// User interactions with notifications.
    Response,
}

impl ListenerKind {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ListenerKind::Received => "received",
            ListenerKind::Response => "response",
        }
    }
}

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    received: BTreeMap<u64, Listener<Notification>>,
    response: BTreeMap<u64, Listener<NotificationResponse>>,
}

impl ListenerRegistry {
    pub(crate) fn add_received(&mut self, key: u64, listener: Listener<Notification>) {
        self.received.insert(key, listener);
    }

    pub(crate) fn add_response(&mut self, key: u64, listener: Listener<NotificationResponse>) {
        self.response.insert(key, listener);
    }

    /// Returns `false` if nothing was registered under `key`.
    pub(crate) fn remove(&mut self, kind: ListenerKind, key: u64) -> bool {
        match kind {
            ListenerKind::Received => self.received.remove(&key).is_some(),
            ListenerKind::Response => self.response.remove(&key).is_some(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.received.is_empty() && self.response.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.received.len() + self.response.len()
    }

    pub(crate) fn received(&self) -> Vec<(u64, Listener<Notification>)> {
        self.received.iter().map(|(k, l)| (*k, Arc::clone(l))).collect()
    }

    pub(crate) fn response(&self) -> Vec<(u64, Listener<NotificationResponse>)> {
        self.response.iter().map(|(k, l)| (*k, Arc::clone(l))).collect()
    }
}
