//! # Native calls.
//!
//! [`NativeBridge`] wires the locator, the dispatch shim and the result
//! normalizer into one call path and exposes one typed operation per native
//! method.
//!
//! ```text
//! op() ─► shim.run ─► locate ─► has_method? ─► invoke(args, callback)
//!                                                  │
//!                        first callback reply ◄────┘
//!                                │
//!                     normalize ─► validate ─► T | NotificationsError
//! ```
//!
//! ## Rules
//! - The capability is looked up again for every call.
//! - The first callback invocation settles the call; later ones are ignored.
//! - A call whose callback is never invoked stays pending; no timeout is imposed.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use super::capability::{
    Callback, CapabilityHandle, CANCEL_ALL_SCHEDULED, CANCEL_SCHEDULED, GET_LAST_RESPONSE,
    GET_PERMISSIONS, GET_PUSH_TOKEN, REQUEST_PERMISSIONS, SCHEDULE_NOTIFICATION,
};
use super::locator::ModuleLocator;
use super::normalize::ResultNormalizer;
use super::validate::PayloadValidator;
use crate::dispatch::DispatchShim;
use crate::error::{CanonicalResult, NotificationsError};
use crate::types::{NotificationRequestInput, NotificationResponse, Permissions, PushProvider, PushToken};
use crate::value::NativeValue;

pub(crate) struct BridgeCore {
    pub(crate) locator: ModuleLocator,
    pub(crate) normalizer: ResultNormalizer,
}

impl BridgeCore {
    /// Locates the module and checks it exposes `method`.
    pub(crate) fn resolve(&self, method: &str) -> CanonicalResult<CapabilityHandle> {
        let module = self.locator.locate()?;
        if !module.has_method(method) {
            return Err(NotificationsError::unavailable(format!(
                "Native module method \"{method}\" is not available."
            )));
        }
        Ok(module)
    }

    async fn call_direct(&self, method: &str, args: Vec<NativeValue>) -> CanonicalResult<NativeValue> {
        let module = self.resolve(method)?;

        let (tx, rx) = oneshot::channel::<Vec<NativeValue>>();
        let slot = Mutex::new(Some(tx));
        let callback = Callback::new(move |reply| {
            if let Some(tx) = slot.lock().take() {
                let _ = tx.send(reply);
            }
        });

        if let Err(thrown) = module.invoke(method, args, callback) {
            return Err(NotificationsError::native(format!(
                "Native {method} threw: {thrown}"
            )));
        }
        drop(module);

        let reply = rx.await.map_err(|_| {
            NotificationsError::native(format!("Native {method} dropped its callback without replying"))
        })?;
        tracing::trace!(method, args = reply.len(), "native reply received");
        self.normalizer.normalize(reply)
    }
}

/// Typed entry points onto the host's notifications module.
#[derive(Clone)]
pub struct NativeBridge {
    core: Arc<BridgeCore>,
    shim: DispatchShim,
}

impl NativeBridge {
    pub fn new(locator: ModuleLocator, normalizer: ResultNormalizer, shim: DispatchShim) -> Self {
        Self {
            core: Arc::new(BridgeCore { locator, normalizer }),
            shim,
        }
    }

    pub(crate) fn core(&self) -> &Arc<BridgeCore> {
        &self.core
    }

    pub(crate) fn shim(&self) -> &DispatchShim {
        &self.shim
    }

    /// Calls `method` and returns its canonical value.
    pub async fn call(&self, method: &'static str, args: Vec<NativeValue>) -> CanonicalResult<NativeValue> {
        let core = Arc::clone(&self.core);
        self.shim
            .run(move || {
                let core = Arc::clone(&core);
                let args = args.clone();
                async move { core.call_direct(method, args).await }
            })
            .await
    }

    fn validator(&self) -> PayloadValidator<'_> {
        PayloadValidator::new(&self.core.normalizer)
    }

    pub async fn get_permissions(&self) -> CanonicalResult<Permissions> {
        let value = self.call(GET_PERMISSIONS, Vec::new()).await?;
        self.validator().permissions(GET_PERMISSIONS, &value)
    }

    pub async fn request_permissions(&self) -> CanonicalResult<Permissions> {
        let value = self.call(REQUEST_PERMISSIONS, Vec::new()).await?;
        self.validator().permissions(REQUEST_PERMISSIONS, &value)
    }

    pub async fn get_push_token(&self, provider: PushProvider) -> CanonicalResult<PushToken> {
        let value = self
            .call(GET_PUSH_TOKEN, vec![NativeValue::from(provider.as_str())])
            .await?;
        self.validator().push_token(GET_PUSH_TOKEN, &value)
    }

    pub async fn schedule_notification(&self, request: &NotificationRequestInput) -> CanonicalResult<String> {
        let encoded = serde_json::to_value(request).map_err(|e| {
            NotificationsError::invalid_argument(format!("Notification request is not serializable: {e}"))
        })?;
        let value = self
            .call(SCHEDULE_NOTIFICATION, vec![NativeValue::from(encoded)])
            .await?;
        self.validator().schedule_id(SCHEDULE_NOTIFICATION, &value)
    }

    pub async fn cancel_scheduled_notification(&self, id: &str) -> CanonicalResult<()> {
        self.call(CANCEL_SCHEDULED, vec![NativeValue::from(id)]).await?;
        Ok(())
    }

    pub async fn cancel_all_scheduled_notifications(&self) -> CanonicalResult<()> {
        self.call(CANCEL_ALL_SCHEDULED, Vec::new()).await?;
        Ok(())
    }

    pub async fn get_last_notification_response(&self) -> CanonicalResult<Option<NotificationResponse>> {
        let value = self.call(GET_LAST_RESPONSE, Vec::new()).await?;
        self.validator().optional_response(GET_LAST_RESPONSE, &value)
    }
}
