//! # Listener subscriptions and the shared native observer.
//!
//! Many listeners, one native observer: the coordinator starts the observer
//! when the first listener arrives and stops it once the last one leaves.
//!
//! ## Architecture
//! ```text
//! add_*_listener ──► ListenerRegistry ◄── snapshot ── dispatch(event)
//!        │                                               ▲
//!        ▼                                               │ EventSink
//! SubscriptionCoordinator ── start/stop ──► ObserverDriver (NativeObserver)
//!        │
//!        └──► Subscription { id, remove() }
//! ```
//!
//! ## Contents
//! - [`SubscriptionCoordinator`] lifecycle and fan-out
//! - [`ObserverDriver`], [`EventSink`] the seam to the native side
//! - [`Subscription`] idempotent removal handle
//! - [`ObserverState`] public view of the lifecycle
//! - [`ListenerKind`] which events a listener receives

mod coordinator;
mod driver;
mod registry;
mod state;
mod subscription;

pub use coordinator::SubscriptionCoordinator;
pub use driver::{EventSink, ObserverDriver};
pub use registry::{Listener, ListenerKind};
pub use state::ObserverState;
pub use subscription::Subscription;
