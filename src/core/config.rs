//! # Bridge configuration.
//!
//! Provides [`BridgeConfig`], the settings consumed by
//! [`NotificationsBuilder`](crate::NotificationsBuilder).
//!
//! ## Sentinel values
//! - `describe_key_limit = 0` → treated as 1 (see [`BridgeConfig::describe_key_limit_clamped`])

use crate::types::PushProvider;

/// Settings for locating the native module and shaping diagnostics.
///
/// ## Field semantics
/// - `module_name`: canonical registry name of the native module
/// - `aliases`: alternative names tried after the canonical one
/// - `describe_key_limit`: keys listed in structural descriptions (min 1)
/// - `default_provider`: provider used when a caller does not name one
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors over
/// sprinkling sentinel checks across the codebase.
#[derive(Clone, Debug)]
pub struct BridgeConfig {
    /// Name the host registers the module under.
    pub module_name: String,

    /// Alternative names, tried in order after `module_name`.
    pub aliases: Vec<String>,

    /// How many keys a structural description lists before truncating.
    ///
    /// Applies to every `NATIVE_FAILURE` message that describes a payload.
    pub describe_key_limit: usize,

    /// Provider used by token operations when none is given.
    pub default_provider: PushProvider,
}

impl BridgeConfig {
    /// Returns the description key limit clamped to a minimum of 1.
    #[inline]
    pub fn describe_key_limit_clamped(&self) -> usize {
        self.describe_key_limit.max(1)
    }
}

impl Default for BridgeConfig {
    /// Default configuration:
    ///
    /// - `module_name = "LynxNotificationsModule"`
    /// - `aliases = ["LynxNotifications"]`
    /// - `describe_key_limit = 8`
    /// - `default_provider = fcm`
    fn default() -> Self {
        Self {
            module_name: "LynxNotificationsModule".to_string(),
            aliases: vec!["LynxNotifications".to_string()],
            describe_key_limit: 8,
            default_provider: PushProvider::Fcm,
        }
    }
}
