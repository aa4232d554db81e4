//! Handle returned for every registered listener.

use std::fmt;
use std::sync::Weak;

use super::coordinator::CoordinatorInner;
use super::registry::ListenerKind;

/// A registered listener. Dropping the handle does **not** remove it.
pub struct Subscription {
    id: String,
    key: u64,
    kind: ListenerKind,
    owner: Weak<CoordinatorInner>,
}

impl Subscription {
    pub(crate) fn new(key: u64, kind: ListenerKind, owner: Weak<CoordinatorInner>) -> Self {
        Self {
            id: format!("notification-subscription-{key}"),
            key,
            kind,
            owner,
        }
    }

    /// Identifier of the form `notification-subscription-N`.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> ListenerKind {
        self.kind
    }

    /// Unregisters the listener. Idempotent.
    pub fn remove(&self) {
        if let Some(owner) = self.owner.upgrade() {
            owner.remove(self.kind, self.key);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish()
    }
}
