//! Lifecycle event tags emitted by the playback engine

use serde::{Deserialize, Serialize};

/// Playback lifecycle events. Tags only, no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// A service started presenting.
    Start,
    /// The service ended; the facade clears its cached playing state when
    /// it sees this.
    End,
    TunedIn,
    TuneFailed,
    UpdatedInfo,
    UpdatedEventInfo,
    SeekableStatusChanged,
    /// End of a file-backed service was reached.
    Eof,
    /// Seeked back to the start of a file-backed service.
    Sof,
}

/// Record lifecycle events, dispatched together with the recording handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordEvent {
    Start,
    End,
    TunedIn,
    TuneFailed,
    RecordRunning,
    RecordStopped,
    RecordFailed,
    WriteError,
}
