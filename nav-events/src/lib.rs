//! Event fan-out for the navigation facade
//!
//! The playback engine emits two event streams: playback lifecycle events
//! (tag only) and record lifecycle events (handle + tag). The
//! [`EventDispatcher`] fans both out synchronously to registered observers
//! in registration order.

mod dispatcher;
mod event;

pub use dispatcher::{EventDispatcher, ObserverId};
pub use event::{PlaybackEvent, RecordEvent};
