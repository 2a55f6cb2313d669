//! Collaborator contracts for the navigation facade
//!
//! The facade itself only sequences decisions; everything that actually
//! tunes, records, evaluates policy or shows UI lives behind the traits in
//! this crate. The playback engine is the one mandatory collaborator, the
//! rest are optional policy and presentation hooks.

mod engine;
mod error;
mod hooks;
mod request;
mod scheduler;

pub use engine::{LiveService, PlaybackBackend, RecordHandle};
pub use error::BackendError;
pub use hooks::{
    ChannelListImporter, CiAlternativeResolver, Notifier, ParentalControl, SelectionCursor,
    SessionMonitor, StreamRelay, UrlRewriter,
};
pub use request::{PlayRequest, ResumeHandle, RetryTicket};
pub use scheduler::{DeferredAction, Scheduler};
