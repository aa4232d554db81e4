//! Shared fixtures for module tests: fake accessor maps, a scriptable
//! native module, and a gated observer driver.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::Notify;

use crate::bridge::{
    Callback, Capability, CapabilityHandle, MapRegistry, ModuleLocator, NativeBridge, RegistrySource, ResultNormalizer,
    CANCEL_ALL_SCHEDULED, CANCEL_SCHEDULED, GET_LAST_RESPONSE, GET_PERMISSIONS, GET_PUSH_TOKEN, REQUEST_PERMISSIONS,
    SCHEDULE_NOTIFICATION, START_OBSERVING, STOP_OBSERVING,
};
use crate::core::{BridgeConfig, Notifications};
use crate::dispatch::DispatchShim;
use crate::error::{CanonicalResult, NotificationsError};
use crate::events::NotificationEvent;
use crate::subscribers::{EventSink, ObserverDriver};
use crate::types::{Notification, NotificationResponse};
use crate::value::{Accessor, AccessorFault, MapLike, NativeValue};

/// Accessor object answering only through configured getters.
pub(crate) struct FakeMap {
    type_name: String,
    getters: HashMap<(Accessor, String), NativeValue>,
    properties: HashMap<String, NativeValue>,
    throwing: HashSet<Accessor>,
    panicking_keys: bool,
}

impl FakeMap {
    pub(crate) fn new(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            getters: HashMap::new(),
            properties: HashMap::new(),
            throwing: HashSet::new(),
            panicking_keys: false,
        }
    }

    fn getter(mut self, accessor: Accessor, key: &str, value: NativeValue) -> Self {
        self.getters.insert((accessor, key.to_string()), value);
        self
    }

    pub(crate) fn with_get(self, key: &str, value: NativeValue) -> Self {
        self.getter(Accessor::Get, key, value)
    }

    pub(crate) fn with_get_map(self, key: &str, value: NativeValue) -> Self {
        self.getter(Accessor::GetMap, key, value)
    }

    pub(crate) fn with_string(self, key: &str, value: &str) -> Self {
        self.getter(Accessor::GetString, key, NativeValue::from(value))
    }

    pub(crate) fn with_boolean(self, key: &str, value: bool) -> Self {
        self.getter(Accessor::GetBoolean, key, NativeValue::from(value))
    }

    pub(crate) fn with_array(self, key: &str, items: Vec<NativeValue>) -> Self {
        self.getter(Accessor::GetArray, key, NativeValue::Array(items))
    }

    pub(crate) fn with_property(mut self, key: &str, value: NativeValue) -> Self {
        self.properties.insert(key.to_string(), value);
        self
    }

    /// Every call through `accessor` throws.
    pub(crate) fn throwing(mut self, accessor: Accessor) -> Self {
        self.throwing.insert(accessor);
        self
    }

    /// `keys()` panics.
    pub(crate) fn panicking_keys(mut self) -> Self {
        self.panicking_keys = true;
        self
    }
}

impl MapLike for FakeMap {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn keys(&self) -> Vec<String> {
        if self.panicking_keys {
            panic!("keys unavailable");
        }
        let keys: BTreeSet<String> = self
            .getters
            .keys()
            .map(|(_, k)| k.clone())
            .chain(self.properties.keys().cloned())
            .collect();
        keys.into_iter().collect()
    }

    fn property(&self, key: &str) -> Option<NativeValue> {
        self.properties.get(key).cloned()
    }

    fn call(&self, accessor: Accessor, key: &str) -> Result<NativeValue, AccessorFault> {
        if self.throwing.contains(&accessor) {
            return Err(AccessorFault::Threw(format!("{} rejected {key}", accessor.method_name())));
        }
        self.getters
            .get(&(accessor, key.to_string()))
            .cloned()
            .ok_or_else(|| AccessorFault::Threw(format!("no {} mapping for {key}", accessor.method_name())))
    }
}

pub(crate) fn ok_reply(data: NativeValue) -> NativeValue {
    NativeValue::object([("ok", NativeValue::from(true)), ("data", data)])
}

pub(crate) fn err_reply(code: &str, message: &str) -> NativeValue {
    NativeValue::object([
        ("ok", NativeValue::from(false)),
        (
            "error",
            NativeValue::object([("code", NativeValue::from(code)), ("message", NativeValue::from(message))]),
        ),
    ])
}

pub(crate) fn sample_notification() -> serde_json::Value {
    json!({
        "id": "notification-1",
        "date": 1_700_000_000_000.0,
        "request": {
            "content": { "title": "Hello", "body": "World" },
            "trigger": null
        }
    })
}

pub(crate) fn sample_response() -> serde_json::Value {
    json!({ "notification": sample_notification(), "actionIdentifier": "default" })
}

pub(crate) fn notification() -> Notification {
    serde_json::from_value(sample_notification()).expect("sample notification")
}

pub(crate) fn response() -> NotificationResponse {
    serde_json::from_value(sample_response()).expect("sample response")
}

type Handler = Arc<dyn Fn(Vec<NativeValue>, Callback) -> Result<(), String> + Send + Sync>;

/// Scriptable native module with per-method handlers and call counters.
#[derive(Clone)]
pub(crate) struct MockModule {
    handlers: Arc<Mutex<HashMap<String, Handler>>>,
    calls: Arc<Mutex<HashMap<String, usize>>>,
    observer: Arc<Mutex<Option<Callback>>>,
}

impl MockModule {
    /// A module answering every method with a well-formed tagged reply.
    pub(crate) fn standard() -> Self {
        let module = Self {
            handlers: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(HashMap::new())),
            observer: Arc::new(Mutex::new(None)),
        };

        let permissions = NativeValue::from(json!({ "status": "granted", "granted": true, "canAskAgain": true }));
        for method in [GET_PERMISSIONS, REQUEST_PERMISSIONS] {
            let reply = ok_reply(permissions.clone());
            module.with_handler(method, move |_, cb| {
                cb.reply(reply.clone());
                Ok(())
            });
        }
        module.with_handler(GET_PUSH_TOKEN, |_, cb| {
            cb.reply(ok_reply(NativeValue::from(json!({ "type": "fcm", "data": "push-token-123" }))));
            Ok(())
        });
        module.with_handler(SCHEDULE_NOTIFICATION, |_, cb| {
            cb.reply(ok_reply(NativeValue::from("notification-id-1")));
            Ok(())
        });
        for method in [CANCEL_SCHEDULED, CANCEL_ALL_SCHEDULED, GET_LAST_RESPONSE] {
            module.with_handler(method, |_, cb| {
                cb.reply(ok_reply(NativeValue::Null));
                Ok(())
            });
        }

        let slot = Arc::clone(&module.observer);
        module.with_handler(START_OBSERVING, move |_, cb| {
            *slot.lock() = Some(cb.clone());
            cb.reply(ok_reply(NativeValue::Null));
            Ok(())
        });
        let slot = Arc::clone(&module.observer);
        module.with_handler(STOP_OBSERVING, move |_, cb| {
            slot.lock().take();
            cb.reply(ok_reply(NativeValue::Null));
            Ok(())
        });

        module
    }

    pub(crate) fn handle(&self) -> CapabilityHandle {
        Arc::new(self.clone())
    }

    /// Installs (or replaces) the handler for `method`.
    pub(crate) fn with_handler<F>(&self, method: &str, handler: F)
    where
        F: Fn(Vec<NativeValue>, Callback) -> Result<(), String> + Send + Sync + 'static,
    {
        self.handlers.lock().insert(method.to_string(), Arc::new(handler));
    }

    /// Removes `method` from the module.
    pub(crate) fn without(&self, method: &str) {
        self.handlers.lock().remove(method);
    }

    pub(crate) fn calls(&self, method: &str) -> usize {
        self.calls.lock().get(method).copied().unwrap_or(0)
    }

    /// Delivers `args` through the registered observer callback.
    pub(crate) fn emit(&self, args: Vec<NativeValue>) {
        let callback = self.observer.lock().clone().expect("observer registered");
        callback.invoke(args);
    }
}

impl Capability for MockModule {
    fn type_name(&self) -> &str {
        "MockModule"
    }

    fn has_method(&self, method: &str) -> bool {
        self.handlers.lock().contains_key(method)
    }

    fn invoke(&self, method: &str, args: Vec<NativeValue>, callback: Callback) -> Result<(), String> {
        *self.calls.lock().entry(method.to_string()).or_default() += 1;
        let handler = self.handlers.lock().get(method).cloned();
        match handler {
            Some(handler) => handler(args, callback),
            None => Err(format!("{method} is not a function")),
        }
    }
}

/// Bridge over a fresh registry holding `module` under the default name.
pub(crate) fn bridge_with(module: &MockModule) -> (NativeBridge, Arc<MapRegistry>) {
    let registry = MapRegistry::new("NativeModules");
    registry.register("LynxNotificationsModule", module.handle());

    let cfg = BridgeConfig::default();
    let source: Arc<dyn RegistrySource> = registry.clone();
    let locator = ModuleLocator::new(cfg.module_name, cfg.aliases, vec![source]);
    let bridge = NativeBridge::new(locator, ResultNormalizer::default(), DispatchShim::default());
    (bridge, registry)
}

/// Façade over a fresh registry holding `module` under the default name.
pub(crate) fn notifications_with(module: &MockModule) -> (Arc<Notifications>, Arc<MapRegistry>) {
    let registry = MapRegistry::new("NativeModules");
    registry.register("LynxNotificationsModule", module.handle());

    let notifications = Notifications::builder(BridgeConfig::default())
        .with_registry(registry.clone())
        .build();
    (notifications, registry)
}

/// Observer driver whose start/stop can be held open and released by tests.
#[derive(Default)]
pub(crate) struct GatedDriver {
    starts: AtomicUsize,
    stops: AtomicUsize,
    hold_start: AtomicBool,
    hold_stop: AtomicBool,
    fail_start: AtomicBool,
    start_gate: Notify,
    stop_gate: Notify,
    sink: Mutex<Option<EventSink>>,
}

impl GatedDriver {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn hold_starts(&self) {
        self.hold_start.store(true, Ordering::SeqCst);
    }

    pub(crate) fn release_start(&self) {
        self.hold_start.store(false, Ordering::SeqCst);
        self.start_gate.notify_one();
    }

    pub(crate) fn hold_stops(&self) {
        self.hold_stop.store(true, Ordering::SeqCst);
    }

    pub(crate) fn release_stop(&self) {
        self.hold_stop.store(false, Ordering::SeqCst);
        self.stop_gate.notify_one();
    }

    pub(crate) fn fail_starts(&self, fail: bool) {
        self.fail_start.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub(crate) fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    /// Delivers `event` as if the native side sent it.
    pub(crate) fn emit(&self, event: NotificationEvent) {
        let sink = self.sink.lock().clone();
        if let Some(sink) = sink {
            sink(event);
        }
    }
}

#[async_trait]
impl ObserverDriver for GatedDriver {
    async fn start(&self, sink: EventSink) -> CanonicalResult<()> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        if self.hold_start.load(Ordering::SeqCst) {
            self.start_gate.notified().await;
        }
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(NotificationsError::native("start refused"));
        }
        *self.sink.lock() = Some(sink);
        Ok(())
    }

    async fn stop(&self) -> CanonicalResult<()> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        if self.hold_stop.load(Ordering::SeqCst) {
            self.stop_gate.notified().await;
        }
        self.sink.lock().take();
        Ok(())
    }
}

/// Lets spawned tasks on the current-thread runtime run to quiescence.
pub(crate) async fn settle() {
    for _ in 0..64 {
        tokio::task::yield_now().await;
    }
}
