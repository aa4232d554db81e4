//! # Observer lifecycle state.
//!
//! ```text
//!   NotObserving ──start──► Starting ──ok──► Observing
//!        ▲                     │                 │
//!        │◄────────failed──────┘                stop
//!        │                                       ▼
//!        └──────────────(always)──────────── Stopping
//! ```
//!
//! The in-flight transition lives inside the phase it belongs to, so a
//! start and a stop can never be in flight at the same time.

use futures::future::{BoxFuture, Shared};

/// Public view of the shared observer's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverState {
    /// No native observer is registered.
    NotObserving,
    /// A start is in flight.
    Starting,
    /// The native observer is registered and delivering events.
    Observing,
    /// A stop is in flight.
    Stopping,
}

impl ObserverState {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ObserverState::NotObserving => "not_observing",
            ObserverState::Starting => "starting",
            ObserverState::Observing => "observing",
            ObserverState::Stopping => "stopping",
        }
    }
}

/// Single-flight transition; every waiter clones and awaits the same future.
pub(crate) type Transition = Shared<BoxFuture<'static, ()>>;

/// Internal state carrying the in-flight transition, if any.
pub(crate) enum Phase {
    NotObserving,
    Starting(Transition),
    Observing,
    Stopping(Transition),
}

impl Phase {
    pub(crate) fn state(&self) -> ObserverState {
        match self {
            Phase::NotObserving => ObserverState::NotObserving,
            Phase::Starting(_) => ObserverState::Starting,
            Phase::Observing => ObserverState::Observing,
            Phase::Stopping(_) => ObserverState::Stopping,
        }
    }
}
