//! The native playback engine contract

use nav_reference::{DeliverySystem, ServiceReference};
use std::sync::Arc;

use crate::BackendError;

/// Handle for an active recording issued by the engine.
///
/// Carries the service being recorded so listings can be filtered without
/// another round trip into the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHandle {
    id: u64,
    reference: ServiceReference,
}

impl RecordHandle {
    pub fn new(id: u64, reference: ServiceReference) -> Self {
        Self { id, reference }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn service_reference(&self) -> &ServiceReference {
        &self.reference
    }
}

/// Live handle to the service the engine is currently presenting.
///
/// Fetched lazily by the facade and cached until an end-of-playback event
/// invalidates it.
pub trait LiveService: Send + Sync {
    /// The reference the engine reports for the running service, if any.
    fn service_reference(&self) -> Option<ServiceReference>;
}

/// The native playback/record engine.
///
/// All calls are synchronous and expected to return quickly; tuner teardown
/// and other slow work happen asynchronously inside the engine, which is why
/// a failed `play` right after releasing a stream may succeed on a short
/// deferred retry.
pub trait PlaybackBackend: Send + Sync {
    /// Start presenting the given concrete service.
    fn play(&self, reference: &ServiceReference) -> Result<(), BackendError>;

    /// Stop the running service. Must be called before `play` when switching.
    fn stop(&self);

    fn pause(&self, paused: bool);

    /// Start a recording; `simulate` asks the engine for a dry-run (used by
    /// timer conflict detection). Returns `None` when the engine cannot
    /// record the service.
    fn record(&self, reference: &ServiceReference, simulate: bool) -> Option<RecordHandle>;

    fn stop_record(&self, handle: &RecordHandle) -> Result<(), BackendError>;

    /// The live service handle, if something is being presented.
    fn current_service(&self) -> Option<Arc<dyn LiveService>>;

    fn recordings(&self, simulate: bool) -> Vec<RecordHandle>;

    /// Resolve a group reference to its best currently-playable member.
    ///
    /// `hint` is the previously playing reference and biases the query
    /// towards continuity; pass the default (invalid) reference for no bias.
    /// With `simulate` the engine may return a member even if it cannot be
    /// played right now, to drive a best-effort attempt.
    fn best_playable_in_group(
        &self,
        group: &ServiceReference,
        hint: &ServiceReference,
        simulate: bool,
    ) -> Option<ServiceReference>;

    /// Whether `candidate` is playable while `playing` occupies its tuner.
    fn is_playable_for(&self, candidate: &ServiceReference, playing: &ServiceReference) -> bool;

    /// Classify a live service by its broadcast standard. Returns `None`
    /// for services the engine cannot classify (streams, files).
    fn classify_delivery(&self, reference: &ServiceReference) -> Option<DeliverySystem>;

    /// Override the preferred front-end slot for subsequent tuning.
    fn set_preferred_tuner(&self, slot: i32);
}

#[cfg(test)]
mod tests {
    use super::*;
    use nav_reference::{ServiceFlags, ServiceKind};

    #[test]
    fn record_handle_exposes_service() {
        let reference =
            ServiceReference::new(ServiceKind::Dvb, ServiceFlags::empty(), "1:0:19:283D::");
        let handle = RecordHandle::new(7, reference.clone());
        assert_eq!(handle.id(), 7);
        assert_eq!(handle.service_reference(), &reference);
    }
}
