//! The cached notion of "currently playing"

use std::sync::Arc;

use nav_backend::LiveService;
use nav_reference::ServiceReference;

/// Single-instance cache owned by [`crate::Navigation`].
///
/// `playing_ref` holds the concrete reference actually handed to the engine,
/// `playing_ref_or_group` what the caller originally asked for (possibly a
/// group). The first is set iff a native play call succeeded and no
/// end-of-playback event was seen since; the second is set whenever the
/// first is, plus during an in-flight best-effort retry.
pub(crate) struct NavigationState {
    pub playing_ref: Option<ServiceReference>,
    pub playing_ref_or_group: Option<ServiceReference>,
    pub live_service: Option<Arc<dyn LiveService>>,
    pub stream_relay_active: bool,
    /// The first relay-switch deferral after construction uses the longer
    /// fixed delay.
    pub first_start: bool,
    /// Staleness token for scheduled retries. Bumped by every
    /// externally-initiated transition; a fired retry whose ticket carries
    /// an older generation is dropped.
    pub retry_generation: u64,
}

impl NavigationState {
    pub fn new() -> Self {
        Self {
            playing_ref: None,
            playing_ref_or_group: None,
            live_service: None,
            stream_relay_active: false,
            first_start: true,
            retry_generation: 0,
        }
    }

    /// Clear the two reference fields, leaving the live-service handle for
    /// the end-of-playback event to invalidate.
    pub fn clear_playing_refs(&mut self) {
        self.playing_ref = None;
        self.playing_ref_or_group = None;
    }

    /// Full invalidation on end-of-playback.
    pub fn clear_all(&mut self) {
        self.clear_playing_refs();
        self.live_service = None;
    }

    pub fn commit(&mut self, concrete: ServiceReference, or_group: ServiceReference) {
        self.playing_ref = Some(concrete);
        self.playing_ref_or_group = Some(or_group);
    }
}
