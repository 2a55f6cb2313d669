use thiserror::Error;

/// Errors surfaced by the native playback engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The engine refused or failed to start playback. Transient; the
    /// facade may schedule a retry depending on what was playing before.
    #[error("engine failed to start playback: {0}")]
    StartFailed(String),

    /// A recording handle was passed that the engine never issued, or that
    /// it has already released.
    #[error("recording handle {0} is not known to the engine")]
    UnknownRecording(u64),

    /// The engine is shutting down or otherwise unreachable.
    #[error("playback engine unavailable")]
    Unavailable,
}
