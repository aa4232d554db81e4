//! # Observer driver seam.
//!
//! The coordinator decides *when* the shared native observer starts and
//! stops; an [`ObserverDriver`] decides *how*. The bridge provides the real
//! implementation; tests plug in a gated one.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CanonicalResult;
use crate::events::NotificationEvent;

/// Receives every recognized event while the observer is running.
pub type EventSink = Arc<dyn Fn(NotificationEvent) + Send + Sync>;

/// Starts and stops the single shared native observer.
#[async_trait]
pub trait ObserverDriver: Send + Sync + 'static {
    /// Registers the native observer; events flow into `sink` until [`stop`](Self::stop).
    async fn start(&self, sink: EventSink) -> CanonicalResult<()>;

    /// Unregisters the native observer.
    async fn stop(&self) -> CanonicalResult<()>;
}
