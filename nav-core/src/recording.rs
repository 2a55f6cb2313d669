//! Recording registry: thin pass-through into the engine
//!
//! Unlike playback, recording failures are never auto-retried; a failed
//! record call is logged and reported, nothing else.

use nav_backend::{BackendError, RecordHandle};
use nav_reference::ServiceReference;
use tracing::{info, warn};

use crate::error::{NavError, Result};
use crate::navigation::Navigation;
use crate::resolve;

impl Navigation {
    /// Start recording a service. Groups resolve through the best-effort
    /// query with the simulate flag forwarded; stream-relay substitution
    /// applies the same way it does for playback.
    pub fn record(&self, reference: &ServiceReference, simulate: bool) -> Option<RecordHandle> {
        if !simulate {
            info!(%reference, "recording service");
        }

        let resolved = if reference.is_group() {
            match self.backend().best_playable_in_group(
                reference,
                &ServiceReference::default(),
                simulate,
            ) {
                Some(resolved) => resolved,
                None => {
                    warn!(group = %reference, "no recordable member in group");
                    return None;
                }
            }
        } else {
            reference.clone()
        };

        let (resolved, _relayed) = match self.relay() {
            Some(relay) => relay.substitute(resolved),
            None => (resolved, false),
        };

        let handle = self.backend().record(&resolved, simulate);
        if handle.is_none() {
            warn!(reference = %resolved, "engine refused to record");
        }
        handle
    }

    /// Stop a recording. A handle the engine does not recognise yields the
    /// sentinel [`NavError::InvalidRecordingHandle`] status.
    pub fn stop_record(&self, handle: &RecordHandle) -> Result<()> {
        self.backend().stop_record(handle).map_err(|err| match err {
            BackendError::UnknownRecording(id) => NavError::InvalidRecordingHandle(id),
            other => NavError::Backend(other),
        })
    }

    /// List active recordings, filtering out synthetic relay streams unless
    /// simulating.
    pub fn recordings(&self, simulate: bool) -> Vec<RecordHandle> {
        let recordings = self.backend().recordings(simulate);
        if simulate {
            return recordings;
        }
        let Some(relay) = self.relay() else {
            return recordings;
        };
        recordings
            .into_iter()
            .filter(|recording| !relay.is_pseudo_recording(recording.service_reference()))
            .collect()
    }

    /// Continuity-aware group resolution with last-resort fallback, exposed
    /// for callers that need a concrete reference without playing it.
    pub fn resolve_alternate(&self, reference: &ServiceReference) -> Option<ServiceReference> {
        let hint = self
            .currently_playing_service_reference()
            .unwrap_or_default();
        resolve::resolve_alternate(self.backend().as_ref(), reference, &hint)
    }
}
