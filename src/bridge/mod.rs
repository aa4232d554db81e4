//! Native boundary: capability lookup, calls, reply normalization, observer.
//!
//! ## Contents
//! - [`Capability`], [`Callback`] the host object and its reply channel
//! - [`RegistrySource`], [`MapRegistry`], [`ModuleLocator`] module lookup
//! - [`ResultNormalizer`] raw callback arguments → canonical result
//! - [`PayloadValidator`] per-operation typed validation
//! - [`NativeBridge`] one typed operation per native method
//! - [`NativeObserver`] the [`ObserverDriver`](crate::subscribers::ObserverDriver)
//!   backed by `startObservingEvents`
//!
//! ## Call path
//! ```text
//! NativeBridge::op
//!   └─► DispatchShim::run
//!         └─► ModuleLocator::locate ─► Capability::invoke ─► Callback
//!                                                             │
//!        PayloadValidator ◄── ResultNormalizer::normalize ◄───┘
//! ```

mod call;
mod capability;
mod locator;
mod normalize;
mod observer;
mod validate;

pub use call::NativeBridge;
pub use capability::{Callback, Capability, CapabilityHandle};
pub use locator::{MapRegistry, ModuleLocator, RegistrySource};
pub use normalize::ResultNormalizer;
pub use observer::NativeObserver;
pub use validate::PayloadValidator;

#[cfg(test)]
pub(crate) use capability::{
    CANCEL_ALL_SCHEDULED, CANCEL_SCHEDULED, GET_LAST_RESPONSE, GET_PERMISSIONS, GET_PUSH_TOKEN,
    REQUEST_PERMISSIONS, SCHEDULE_NOTIFICATION, START_OBSERVING, STOP_OBSERVING,
};
