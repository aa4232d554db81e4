//! # Native observer.
//!
//! Implements [`ObserverDriver`] on top of `startObservingEvents` /
//! `stopObservingEvents`.
//!
//! ## Event callback
//! ```text
//! args ─► select_payload ─┬─ tagged {ok: true}   ─► ignored (ack)
//!                         ├─ tagged {ok: false}  ─► warn
//!                         └─ anything else ─► parse_event ─┬─ Some ─► sink
//!                                                          └─ None ─► debug, dropped
//! ```
//!
//! ## Rules
//! - `stopObservingEvents` is optional; a module without it stops trivially.
//! - Stop only honors a reply delivered synchronously during the call;
//!   otherwise it resolves without waiting.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use super::call::{BridgeCore, NativeBridge};
use super::capability::{Callback, START_OBSERVING, STOP_OBSERVING};
use super::normalize::ResultNormalizer;
use crate::error::{CanonicalResult, NotificationsError};
use crate::events::{parse_event, NotificationEvent};
use crate::subscribers::{EventSink, ObserverDriver};
use crate::unwind::panic_message;
use crate::value::NativeValue;

/// Drives the shared native observer through a [`NativeBridge`].
pub struct NativeObserver {
    bridge: NativeBridge,
}

impl NativeObserver {
    pub fn new(bridge: NativeBridge) -> Self {
        Self { bridge }
    }
}

#[async_trait]
impl ObserverDriver for NativeObserver {
    async fn start(&self, sink: EventSink) -> CanonicalResult<()> {
        let core = Arc::clone(self.bridge.core());
        self.bridge
            .shim()
            .run(move || {
                let core = Arc::clone(&core);
                let sink = Arc::clone(&sink);
                async move { start_observing(core, sink) }
            })
            .await
    }

    async fn stop(&self) -> CanonicalResult<()> {
        let core = Arc::clone(self.bridge.core());
        self.bridge
            .shim()
            .run(move || {
                let core = Arc::clone(&core);
                async move { stop_observing(&core) }
            })
            .await
    }
}

fn start_observing(core: Arc<BridgeCore>, sink: EventSink) -> CanonicalResult<()> {
    let module = core.resolve(START_OBSERVING)?;
    let handler = Arc::clone(&core);
    let callback = Callback::new(move |args| on_native_event(&handler, &sink, args));

    module
        .invoke(START_OBSERVING, Vec::new(), callback)
        .map_err(|thrown| NotificationsError::native(format!("Native {START_OBSERVING} threw: {thrown}")))?;
    tracing::debug!(module = core.locator.name(), "native observer registered");
    Ok(())
}

fn stop_observing(core: &BridgeCore) -> CanonicalResult<()> {
    let module = core.locator.locate()?;
    if !module.has_method(STOP_OBSERVING) {
        tracing::debug!(module = core.locator.name(), "module has no stopObservingEvents, nothing to stop");
        return Ok(());
    }

    let (tx, mut rx) = oneshot::channel::<Vec<NativeValue>>();
    let slot = Mutex::new(Some(tx));
    let callback = Callback::new(move |reply| {
        if let Some(tx) = slot.lock().take() {
            let _ = tx.send(reply);
        }
    });

    module
        .invoke(STOP_OBSERVING, Vec::new(), callback)
        .map_err(|thrown| NotificationsError::native(format!("Native {STOP_OBSERVING} threw: {thrown}")))?;

    match rx.try_recv() {
        Ok(reply) if !reply.iter().all(NativeValue::is_nullish) => core.normalizer.normalize(reply).map(|_| ()),
        _ => Ok(()),
    }
}

fn on_native_event(core: &BridgeCore, sink: &EventSink, args: Vec<NativeValue>) {
    match panic::catch_unwind(AssertUnwindSafe(|| classify(&core.normalizer, args))) {
        Ok(Some(event)) => sink(event),
        Ok(None) => {}
        Err(payload) => {
            tracing::debug!(panic = %panic_message(&*payload), "native event could not be read; dropped")
        }
    }
}

fn classify(normalizer: &ResultNormalizer, args: Vec<NativeValue>) -> Option<NotificationEvent> {
    let payload = normalizer.select_payload(args);

    if let Some(ok) = normalizer.reader().read_bool(&payload, "ok") {
        if !ok {
            if let Err(err) = normalizer.canonicalize(payload) {
                tracing::warn!(method = START_OBSERVING, kind = err.as_label(), error = %err, "native observer reported a failure");
            }
        }
        return None;
    }

    let event = parse_event(normalizer.reader(), &payload);
    if event.is_none() {
        tracing::debug!(payload = %normalizer.describe(&payload), "unrecognized native event dropped");
    }
    event
}
