use std::sync::Arc;

use super::{config::BridgeConfig, notifications::Notifications};
use crate::bridge::{ModuleLocator, NativeBridge, NativeObserver, RegistrySource, ResultNormalizer};
use crate::dispatch::{DispatchShim, Dispatcher, Inline};
use crate::subscribers::SubscriptionCoordinator;
use crate::value::FieldReader;

/// Builder for constructing [`Notifications`] with optional host integrations.
pub struct NotificationsBuilder {
    cfg: BridgeConfig,
    registries: Vec<Arc<dyn RegistrySource>>,
    dispatcher: Arc<dyn Dispatcher>,
    reader: FieldReader,
}

impl NotificationsBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: BridgeConfig) -> Self {
        Self {
            cfg,
            registries: Vec::new(),
            dispatcher: Arc::new(Inline),
            reader: FieldReader::default(),
        }
    }

    /// Adds a registry the module may be found in.
    ///
    /// Sources are searched in the order they were added.
    pub fn with_registry(mut self, source: Arc<dyn RegistrySource>) -> Self {
        self.registries.push(source);
        self
    }

    /// Sets the dispatcher deciding where native calls run (default: [`Inline`]).
    pub fn with_dispatcher(mut self, dispatcher: impl Dispatcher) -> Self {
        self.dispatcher = Arc::new(dispatcher);
        self
    }

    /// Replaces the field reader chain used for every reply and event.
    pub fn with_field_reader(mut self, reader: FieldReader) -> Self {
        self.reader = reader;
        self
    }

    /// Builds and returns the [`Notifications`] instance.
    ///
    /// Wires the locator, normalizer and dispatch shim into one
    /// [`NativeBridge`], and gives the subscription coordinator a
    /// [`NativeObserver`] over the same bridge.
    pub fn build(self) -> Arc<Notifications> {
        if self.registries.is_empty() {
            tracing::warn!(module = %self.cfg.module_name, "no registry sources configured, every call will fail");
        }

        let locator = ModuleLocator::new(self.cfg.module_name.clone(), self.cfg.aliases.clone(), self.registries);
        let normalizer = ResultNormalizer::new(Arc::new(self.reader), self.cfg.describe_key_limit_clamped());
        let bridge = NativeBridge::new(locator, normalizer, DispatchShim::new(self.dispatcher));
        let coordinator = SubscriptionCoordinator::new(Arc::new(NativeObserver::new(bridge.clone())));

        Arc::new(Notifications::new_internal(self.cfg, bridge, coordinator))
    }
}
