//! # Module locator.
//!
//! Resolves the capability object from one or more host registries whose
//! naming conventions are not standardized.
//!
//! ## Lookup order (per source)
//! ```text
//! source.get(name), source.get(alias…)       (accessor-style registries)
//! source.property(name)
//! source.property(alias…)
//! case-insensitive scan of source.keys()
//! ```
//! The first hit wins. When nothing matches, the failure lists every key
//! observed across all sources (deduplicated), never the objects themselves.
//!
//! ## Rules
//! - Pure lookup: no caching, safe to call concurrently and repeatedly.
//! - The host may replace a registration at any time; the next lookup sees it.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::capability::CapabilityHandle;
use crate::error::{CanonicalResult, NotificationsError};

/// A place where the host registers native modules.
pub trait RegistrySource: Send + Sync + 'static {
    /// Name used in diagnostics (e.g. `"NativeModules"`).
    fn label(&self) -> &str;

    /// Accessor-style lookup; registries without a getter keep the default.
    fn get(&self, _name: &str) -> Option<CapabilityHandle> {
        None
    }

    /// Direct property access.
    fn property(&self, key: &str) -> Option<CapabilityHandle>;

    /// Enumerable keys.
    fn keys(&self) -> Vec<String>;
}

/// In-memory registry the host can mutate at runtime.
///
/// Plain registries answer [`RegistrySource::property`]; accessor registries
/// answer [`RegistrySource::get`] only. Both enumerate their keys.
pub struct MapRegistry {
    label: String,
    accessor_style: bool,
    entries: RwLock<BTreeMap<String, CapabilityHandle>>,
}

impl MapRegistry {
    /// A registry exposing modules as plain properties.
    pub fn new(label: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            label: label.into(),
            accessor_style: false,
            entries: RwLock::new(BTreeMap::new()),
        })
    }

    /// A registry exposing modules through a `get(name)` accessor.
    pub fn accessor(label: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            label: label.into(),
            accessor_style: true,
            entries: RwLock::new(BTreeMap::new()),
        })
    }

    /// Registers (or replaces) a module under `name`.
    pub fn register(&self, name: impl Into<String>, module: CapabilityHandle) {
        self.entries.write().insert(name.into(), module);
    }

    /// Removes a module; returns whether one was registered.
    pub fn remove(&self, name: &str) -> bool {
        self.entries.write().remove(name).is_some()
    }
}

impl RegistrySource for MapRegistry {
    fn label(&self) -> &str {
        &self.label
    }

    fn get(&self, name: &str) -> Option<CapabilityHandle> {
        if !self.accessor_style {
            return None;
        }
        self.entries.read().get(name).cloned()
    }

    fn property(&self, key: &str) -> Option<CapabilityHandle> {
        if self.accessor_style {
            return None;
        }
        self.entries.read().get(key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }
}

/// Resolves the notifications capability across registry sources.
#[derive(Clone)]
pub struct ModuleLocator {
    name: String,
    aliases: Vec<String>,
    sources: Vec<Arc<dyn RegistrySource>>,
}

impl ModuleLocator {
    pub fn new(
        name: impl Into<String>,
        aliases: Vec<String>,
        sources: Vec<Arc<dyn RegistrySource>>,
    ) -> Self {
        Self {
            name: name.into(),
            aliases,
            sources,
        }
    }

    /// Canonical module name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks the module up; fails with `NOTIFICATIONS_UNAVAILABLE` if no source has it.
    pub fn locate(&self) -> CanonicalResult<CapabilityHandle> {
        let mut observed: Vec<String> = Vec::new();

        for source in &self.sources {
            if let Some(found) = self.locate_in(source.as_ref(), &mut observed) {
                tracing::trace!(module = %self.name, source = source.label(), "native module located");
                return Ok(found);
            }
        }

        let registered = if observed.is_empty() {
            "none".to_string()
        } else {
            observed.join(", ")
        };
        Err(NotificationsError::unavailable(format!(
            "Native module \"{}\" is not available. Registered modules: {registered}.",
            self.name
        )))
    }

    fn locate_in(&self, source: &dyn RegistrySource, observed: &mut Vec<String>) -> Option<CapabilityHandle> {
        let names = || std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str));

        if let Some(found) = names().find_map(|n| source.get(n)) {
            return Some(found);
        }
        if let Some(found) = source.property(&self.name) {
            return Some(found);
        }
        if let Some(found) = self.aliases.iter().find_map(|a| source.property(a)) {
            return Some(found);
        }

        let keys = source.keys();
        let hit = keys
            .iter()
            .find(|key| names().any(|n| key.eq_ignore_ascii_case(n)))
            .and_then(|key| source.get(key).or_else(|| source.property(key)));

        for key in keys {
            if !observed.contains(&key) {
                observed.push(key);
            }
        }
        hit
    }
}
