//! # Subscription coordinator.
//!
//! Reference-counts listeners and owns the lifecycle of the single shared
//! native observer.
//!
//! ## Architecture
//! ```text
//! add_listener ──► registry.insert ──► spawn ensure_started
//! remove       ──► registry.remove ──► (empty?) spawn ensure_stopped
//!
//! ensure_started:                         ensure_stopped:
//!   Observing        → done                 NotObserving     → done
//!   Starting(t)      → await t              Stopping(t)      → await t
//!   Stopping(t)      → await t, re-check    Starting(t)      → await t, re-check
//!   NotObserving     → no listeners? done   Observing        → listeners? done
//!                      else Starting(new)                      else Stopping(new)
//!
//! start completes → Observing (or NotObserving on failure);
//!                   no listeners left? spawn ensure_stopped
//! stop completes  → NotObserving (always);
//!                   listeners present? spawn ensure_started
//! ```
//!
//! ## Rules
//! - At most one transition is in flight; concurrent requests share it.
//! - Locks are never held across an await. Lock order is phase, then listeners.
//! - Dispatch iterates a snapshot of the listeners registered when the event
//!   arrived; a panicking listener is logged and skipped.
//! - A failed start is not retried until the next listener is added.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::runtime::Handle;

use super::driver::{EventSink, ObserverDriver};
use super::registry::{Listener, ListenerKind, ListenerRegistry};
use super::state::{ObserverState, Phase, Transition};
use super::subscription::Subscription;
use crate::events::NotificationEvent;
use crate::types::{Notification, NotificationResponse};
use crate::unwind::panic_message;

#[derive(Clone, Copy, Debug)]
enum Toward {
    Observing,
    NotObserving,
}

enum Step {
    Done,
    Begin,
    Join(Transition),
    Wait(Transition),
}

/// Multiplexes one native observer to many listener subscriptions.
pub struct SubscriptionCoordinator {
    inner: Arc<CoordinatorInner>,
}

pub(crate) struct CoordinatorInner {
    driver: Arc<dyn ObserverDriver>,
    phase: Mutex<Phase>,
    listeners: Mutex<ListenerRegistry>,
    next_key: AtomicU64,
}

impl SubscriptionCoordinator {
    pub fn new(driver: Arc<dyn ObserverDriver>) -> Self {
        Self {
            inner: Arc::new(CoordinatorInner {
                driver,
                phase: Mutex::new(Phase::NotObserving),
                listeners: Mutex::new(ListenerRegistry::default()),
                next_key: AtomicU64::new(0),
            }),
        }
    }

    /// Registers a listener for delivered notifications.
    pub fn add_received_listener<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        let listener: Listener<Notification> = Arc::new(listener);
        self.add(ListenerKind::Received, |registry, key| registry.add_received(key, listener))
    }

    /// Registers a listener for notification responses.
    pub fn add_response_listener<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&NotificationResponse) + Send + Sync + 'static,
    {
        let listener: Listener<NotificationResponse> = Arc::new(listener);
        self.add(ListenerKind::Response, |registry, key| registry.add_response(key, listener))
    }

    /// Current lifecycle state of the shared observer.
    pub fn state(&self) -> ObserverState {
        self.inner.phase.lock().state()
    }

    /// Number of registered listeners across both kinds.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }

    fn add(&self, kind: ListenerKind, insert: impl FnOnce(&mut ListenerRegistry, u64)) -> Subscription {
        let key = self.inner.next_key.fetch_add(1, Ordering::Relaxed) + 1;
        insert(&mut self.inner.listeners.lock(), key);
        tracing::debug!(listener = key, kind = kind.as_label(), "listener added");

        self.inner.reconcile(Toward::Observing);
        Subscription::new(key, kind, Arc::downgrade(&self.inner))
    }
}

impl CoordinatorInner {
    pub(crate) fn remove(self: &Arc<Self>, kind: ListenerKind, key: u64) {
        let (removed, idle) = {
            let mut listeners = self.listeners.lock();
            (listeners.remove(kind, key), listeners.is_empty())
        };
        if !removed {
            return;
        }
        tracing::debug!(listener = key, kind = kind.as_label(), "listener removed");

        if idle {
            self.reconcile(Toward::NotObserving);
        }
    }

    fn reconcile(self: &Arc<Self>, toward: Toward) {
        let inner = Arc::clone(self);
        let task: BoxFuture<'static, ()> = match toward {
            Toward::Observing => inner.ensure_started().boxed(),
            Toward::NotObserving => inner.ensure_stopped().boxed(),
        };

        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(task);
            }
            Err(_) => {
                tracing::warn!(toward = ?toward, state = self.phase.lock().state().as_label(), "no tokio runtime, observer transition skipped");
            }
        }
    }

    async fn ensure_started(self: Arc<Self>) {
        loop {
            let step = {
                let mut phase = self.phase.lock();
                let step = match &*phase {
                    Phase::Observing => Step::Done,
                    Phase::Starting(t) => Step::Join(t.clone()),
                    Phase::Stopping(t) => Step::Wait(t.clone()),
                    Phase::NotObserving => Step::Begin,
                };
                match step {
                    Step::Begin if self.listeners.lock().is_empty() => Step::Done,
                    Step::Begin => {
                        let transition = self.start_transition();
                        *phase = Phase::Starting(transition.clone());
                        tracing::debug!(state = "starting", "starting native observer");
                        Step::Join(transition)
                    }
                    other => other,
                }
            };

            match step {
                Step::Join(t) => return t.await,
                Step::Wait(t) => t.await,
                Step::Done | Step::Begin => return,
            }
        }
    }

    async fn ensure_stopped(self: Arc<Self>) {
        loop {
            let step = {
                let mut phase = self.phase.lock();
                let step = match &*phase {
                    Phase::NotObserving => Step::Done,
                    Phase::Stopping(t) => Step::Join(t.clone()),
                    Phase::Starting(t) => Step::Wait(t.clone()),
                    Phase::Observing => Step::Begin,
                };
                match step {
                    Step::Begin if !self.listeners.lock().is_empty() => Step::Done,
                    Step::Begin => {
                        let transition = self.stop_transition();
                        *phase = Phase::Stopping(transition.clone());
                        tracing::debug!(state = "stopping", "stopping native observer");
                        Step::Join(transition)
                    }
                    other => other,
                }
            };

            match step {
                Step::Join(t) => return t.await,
                Step::Wait(t) => t.await,
                Step::Done | Step::Begin => return,
            }
        }
    }

    fn start_transition(self: &Arc<Self>) -> Transition {
        let inner = Arc::clone(self);
        async move {
            let sink = inner.sink();
            let started = match AssertUnwindSafe(inner.driver.start(sink)).catch_unwind().await {
                Ok(Ok(())) => true,
                Ok(Err(err)) => {
                    tracing::warn!(kind = err.as_label(), error = %err, "failed to start native event observer");
                    false
                }
                Err(payload) => {
                    tracing::warn!(panic = %panic_message(&*payload), "native event observer start panicked");
                    false
                }
            };

            let idle = {
                let mut phase = inner.phase.lock();
                *phase = if started {
                    Phase::Observing
                } else {
                    Phase::NotObserving
                };
                inner.listeners.lock().is_empty()
            };

            if started {
                tracing::debug!(state = "observing", "native observer started");
                if idle {
                    inner.reconcile(Toward::NotObserving);
                }
            }
        }
        .boxed()
        .shared()
    }

    fn stop_transition(self: &Arc<Self>) -> Transition {
        let inner = Arc::clone(self);
        async move {
            match AssertUnwindSafe(inner.driver.stop()).catch_unwind().await {
                Ok(Ok(())) => tracing::debug!(state = "not_observing", "native observer stopped"),
                Ok(Err(err)) => {
                    tracing::warn!(kind = err.as_label(), error = %err, "failed to stop native event observer")
                }
                Err(payload) => {
                    tracing::warn!(panic = %panic_message(&*payload), "native event observer stop panicked")
                }
            }

            let wanted = {
                let mut phase = inner.phase.lock();
                *phase = Phase::NotObserving;
                !inner.listeners.lock().is_empty()
            };

            if wanted {
                inner.reconcile(Toward::Observing);
            }
        }
        .boxed()
        .shared()
    }

    fn sink(self: &Arc<Self>) -> EventSink {
        let owner = Arc::downgrade(self);
        Arc::new(move |event: NotificationEvent| {
            if let Some(inner) = owner.upgrade() {
                inner.dispatch(event);
            }
        })
    }

    fn dispatch(&self, event: NotificationEvent) {
        match event {
            NotificationEvent::Received(notification) => {
                let listeners = self.listeners.lock().received();
                notify(ListenerKind::Received, listeners, &notification);
            }
            NotificationEvent::Response(response) => {
                let listeners = self.listeners.lock().response();
                notify(ListenerKind::Response, listeners, &response);
            }
            NotificationEvent::TokenRefreshed(_) => {
                tracing::debug!(event = "token_refreshed", "event has no listener kind, dropped");
            }
        }
    }
}

fn notify<T>(kind: ListenerKind, listeners: Vec<(u64, Listener<T>)>, payload: &T) {
    for (key, listener) in listeners {
        if let Err(panic_err) = panic::catch_unwind(AssertUnwindSafe(|| listener(payload))) {
            tracing::warn!(
                listener = key,
                kind = kind.as_label(),
                panic = %panic_message(&*panic_err),
                "listener callback panicked"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::testkit::{notification, response, settle, GatedDriver};

    fn counter() -> (Arc<AtomicUsize>, impl Fn(&Notification) + Send + Sync + 'static) {
        let hits = Arc::new(AtomicUsize::new(0));
        let out = Arc::clone(&hits);
        (hits, move |_: &Notification| {
            out.fetch_add(1, Ordering::SeqCst);
        })
    }

    fn hits(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    #[tokio::test(flavor = "current_thread")]
    async fn concurrent_adds_issue_one_start() {
        let driver = GatedDriver::new();
        driver.hold_starts();
        let coordinator = SubscriptionCoordinator::new(driver.clone());

        let _a = coordinator.add_received_listener(|_| {});
        let _b = coordinator.add_response_listener(|_| {});
        settle().await;
        assert_eq!(driver.starts(), 1);
        assert_eq!(coordinator.state(), ObserverState::Starting);

        driver.release_start();
        settle().await;
        assert_eq!(driver.starts(), 1);
        assert_eq!(coordinator.state(), ObserverState::Observing);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn removal_during_start_stops_only_after_start_resolves() {
        let driver = GatedDriver::new();
        driver.hold_starts();
        let coordinator = SubscriptionCoordinator::new(driver.clone());

        let a = coordinator.add_received_listener(|_| {});
        settle().await;
        a.remove();
        settle().await;
        assert_eq!(driver.stops(), 0);
        assert_eq!(coordinator.state(), ObserverState::Starting);

        driver.release_start();
        settle().await;
        assert_eq!(driver.starts(), 1);
        assert_eq!(driver.stops(), 1);
        assert_eq!(coordinator.state(), ObserverState::NotObserving);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn re_adding_during_start_cancels_the_stop() {
        let driver = GatedDriver::new();
        driver.hold_starts();
        let coordinator = SubscriptionCoordinator::new(driver.clone());

        let a = coordinator.add_received_listener(|_| {});
        settle().await;
        a.remove();
        let _b = coordinator.add_received_listener(|_| {});
        driver.release_start();
        settle().await;

        assert_eq!(driver.starts(), 1);
        assert_eq!(driver.stops(), 0);
        assert_eq!(coordinator.state(), ObserverState::Observing);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn double_remove_is_a_no_op() {
        let driver = GatedDriver::new();
        let coordinator = SubscriptionCoordinator::new(driver.clone());

        let a = coordinator.add_received_listener(|_| {});
        let b = coordinator.add_received_listener(|_| {});
        settle().await;

        a.remove();
        a.remove();
        settle().await;
        assert_eq!(driver.stops(), 0);
        assert_eq!(coordinator.listener_count(), 1);

        b.remove();
        b.remove();
        settle().await;
        assert_eq!(driver.stops(), 1);
        assert_eq!(coordinator.listener_count(), 0);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn full_listener_scenario() {
        let driver = GatedDriver::new();
        let coordinator = SubscriptionCoordinator::new(driver.clone());
        let (a_hits, a_listener) = counter();
        let (b_hits, b_listener) = counter();

        let a = coordinator.add_received_listener(a_listener);
        let b = coordinator.add_received_listener(b_listener);
        settle().await;
        assert_eq!(driver.starts(), 1);

        driver.emit(NotificationEvent::Received(notification()));
        assert_eq!((hits(&a_hits), hits(&b_hits)), (1, 1));

        a.remove();
        settle().await;
        driver.emit(NotificationEvent::Received(notification()));
        assert_eq!((hits(&a_hits), hits(&b_hits)), (1, 2));

        b.remove();
        settle().await;
        assert_eq!(driver.starts(), 1);
        assert_eq!(driver.stops(), 1);
        assert_eq!(coordinator.state(), ObserverState::NotObserving);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn panicking_listener_does_not_block_others() {
        let driver = GatedDriver::new();
        let coordinator = SubscriptionCoordinator::new(driver.clone());
        let (hits_after, listener) = counter();

        let _bad = coordinator.add_received_listener(|_| panic!("listener exploded"));
        let _good = coordinator.add_received_listener(listener);
        settle().await;

        driver.emit(NotificationEvent::Received(notification()));
        driver.emit(NotificationEvent::Received(notification()));
        assert_eq!(hits(&hits_after), 2);
        assert_eq!(coordinator.state(), ObserverState::Observing);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn events_reach_only_their_kind() {
        let driver = GatedDriver::new();
        let coordinator = SubscriptionCoordinator::new(driver.clone());
        let (received_hits, received) = counter();
        let responses = Arc::new(AtomicUsize::new(0));
        let out = Arc::clone(&responses);

        let _r = coordinator.add_received_listener(received);
        let _s = coordinator.add_response_listener(move |r| {
            assert_eq!(r.action_identifier, "default");
            out.fetch_add(1, Ordering::SeqCst);
        });
        settle().await;

        driver.emit(NotificationEvent::Response(response()));
        driver.emit(NotificationEvent::TokenRefreshed(crate::types::PushToken {
            kind: crate::types::PushTokenKind::Fcm,
            data: "rotated".into(),
        }));
        assert_eq!(hits(&received_hits), 0);
        assert_eq!(hits(&responses), 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn add_during_stop_waits_then_restarts() {
        let driver = GatedDriver::new();
        let coordinator = SubscriptionCoordinator::new(driver.clone());

        let a = coordinator.add_received_listener(|_| {});
        settle().await;
        driver.hold_stops();
        a.remove();
        settle().await;
        assert_eq!(coordinator.state(), ObserverState::Stopping);

        let _b = coordinator.add_received_listener(|_| {});
        settle().await;
        assert_eq!(driver.starts(), 1);

        driver.release_stop();
        settle().await;
        assert_eq!(driver.stops(), 1);
        assert_eq!(driver.starts(), 2);
        assert_eq!(coordinator.state(), ObserverState::Observing);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn failed_start_returns_to_not_observing_until_next_add() {
        let driver = GatedDriver::new();
        driver.fail_starts(true);
        let coordinator = SubscriptionCoordinator::new(driver.clone());

        let _a = coordinator.add_received_listener(|_| {});
        settle().await;
        assert_eq!(driver.starts(), 1);
        assert_eq!(coordinator.state(), ObserverState::NotObserving);

        driver.fail_starts(false);
        let _b = coordinator.add_received_listener(|_| {});
        settle().await;
        assert_eq!(driver.starts(), 2);
        assert_eq!(coordinator.state(), ObserverState::Observing);
    }

    #[test]
    fn without_runtime_listeners_register_but_observer_stays_idle() {
        let driver = GatedDriver::new();
        let coordinator = SubscriptionCoordinator::new(driver.clone());

        let sub = coordinator.add_received_listener(|_| {});
        assert_eq!(sub.id(), "notification-subscription-1");
        assert_eq!(coordinator.state(), ObserverState::NotObserving);
        assert_eq!(driver.starts(), 0);
    }
}
