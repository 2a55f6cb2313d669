//! Service reference value types for the navigation facade
//!
//! A [`ServiceReference`] identifies a playable unit (a DVB service, a file,
//! a network stream) or a group of alternatives (a bouquet). References are
//! immutable once constructed, cheaply clonable and compared structurally.
//!
//! Group references are never tunable themselves; they are resolved to a
//! concrete member through the playback engine's best-playable query.

mod delivery;
mod reference;

pub use delivery::DeliverySystem;
pub use reference::{ServiceFlags, ServiceKind, ServiceReference};
