use nav_backend::BackendError;
use thiserror::Error;

/// Result type for navigation operations
pub type Result<T> = std::result::Result<T, NavError>;

/// Errors surfaced by the navigation facade.
///
/// None of these are fatal to the process; every failure degrades to
/// "nothing is playing" plus an optional user notification.
#[derive(Error, Debug)]
pub enum NavError {
    /// A second Navigation was constructed while one is alive.
    #[error("a navigation instance is already alive")]
    AlreadyConstructed,

    /// A recording stop was requested with a handle the engine never
    /// issued. Sentinel status, not fatal.
    #[error("recording handle {0} is not a live recording")]
    InvalidRecordingHandle(u64),

    /// Passed through from the playback engine.
    #[error("playback engine error: {0}")]
    Backend(#[from] BackendError),
}
