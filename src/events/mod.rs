//! Native events: data model and envelope parser.
//!
//! ## Contents
//! - [`NotificationEvent`] the closed set of events delivered to listeners
//! - [`parse_event`] total mapping from an arbitrary payload to an event
//!
//! Events are a best-effort broadcast channel: malformed payloads are
//! dropped here and never surface as errors.

mod event;
mod parse;

pub use event::NotificationEvent;
pub use parse::parse_event;
