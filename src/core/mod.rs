//! Public façade: configuration, builder and the [`Notifications`] API.
//!
//! ## Wiring
//! ```text
//! NotificationsBuilder::build()
//!   ├─► ModuleLocator(registries, module_name, aliases)
//!   ├─► ResultNormalizer(FieldReader, describe_key_limit)
//!   ├─► DispatchShim(dispatcher)
//!   │        └──────────────► NativeBridge ◄──┐
//!   └─► SubscriptionCoordinator(NativeObserver)┘
//! ```

mod builder;
mod config;
mod notifications;

pub use builder::NotificationsBuilder;
pub use config::BridgeConfig;
pub use notifications::Notifications;
