//! Group-to-concrete reference resolution
//!
//! Groups are resolved only through the engine's best-playable query; the
//! previously playing reference biases the query towards continuity.

use nav_backend::PlaybackBackend;
use nav_reference::ServiceReference;

/// Continuity-aware resolution. Non-group references resolve to themselves;
/// a group with no playable member resolves to `None`.
pub fn resolve_group(
    backend: &dyn PlaybackBackend,
    reference: &ServiceReference,
    hint: &ServiceReference,
) -> Option<ServiceReference> {
    if !reference.is_group() {
        return Some(reference.clone());
    }
    backend.best_playable_in_group(reference, hint, false)
}

/// Last-resort resolution: no continuity hint, simulate flag set, so the
/// engine may hand back a member that cannot currently be played, to drive a
/// best-effort attempt.
pub fn resolve_group_ignoring_previous(
    backend: &dyn PlaybackBackend,
    reference: &ServiceReference,
) -> Option<ServiceReference> {
    if !reference.is_group() {
        return Some(reference.clone());
    }
    backend.best_playable_in_group(reference, &ServiceReference::default(), true)
}

/// Resolve a group with continuity first, falling back to the
/// ignoring-previous query. Returns `None` for non-group references; callers
/// that already hold a concrete reference have nothing to resolve.
pub fn resolve_alternate(
    backend: &dyn PlaybackBackend,
    reference: &ServiceReference,
    hint: &ServiceReference,
) -> Option<ServiceReference> {
    if !reference.is_group() {
        return None;
    }
    backend
        .best_playable_in_group(reference, hint, false)
        .or_else(|| backend.best_playable_in_group(reference, &ServiceReference::default(), true))
}
