//! Policy and presentation hooks
//!
//! Each hook is consumed behind a trait object; all of them are optional
//! collaborators of the facade except where noted. Implementations must not
//! call back into the facade while a hook is being evaluated, with the one
//! exception of the parental-control resume token which is designed for it.

use nav_reference::ServiceReference;

use crate::ResumeHandle;

/// Parental-control gate.
pub trait ParentalControl: Send + Sync {
    /// Whether the service may be played right now.
    ///
    /// On rejection the gate keeps the `resume` token; if the user
    /// authenticates later it re-enters the transition via
    /// `Navigation::resume`, which replays the captured request with the
    /// check disabled.
    fn is_service_playable(&self, reference: &ServiceReference, resume: ResumeHandle) -> bool;
}

/// Stream-relay (CI bypass) substitution.
pub trait StreamRelay: Send + Sync {
    /// Substitute the reference with its relay-proxied counterpart when the
    /// service is configured for relaying. Returns the (possibly unchanged)
    /// reference and whether substitution happened. Must be idempotent for
    /// already-substituted references.
    fn substitute(&self, reference: ServiceReference) -> (ServiceReference, bool);

    /// Whether the service is configured to play through the relay.
    fn is_relay_service(&self, reference: &ServiceReference) -> bool;

    /// Whether a recording of this service is a synthetic relay stream
    /// rather than a user or timer recording.
    fn is_pseudo_recording(&self, reference: &ServiceReference) -> bool;
}

/// Substitute reference selection for conditional-access constraints.
pub trait CiAlternativeResolver: Send + Sync {
    /// Pick a member of `group` that satisfies the CI assignment when
    /// `candidate` does not. `None` leaves the candidate unchanged.
    fn resolve_alternative(
        &self,
        group: &ServiceReference,
        candidate: &ServiceReference,
    ) -> Option<ServiceReference>;
}

/// One link of the URL-rewrite plugin chain.
///
/// The chain is evaluated in order; the first rewriter returning a new URL
/// wins and the rest are skipped. An error aborts the whole transition and
/// is surfaced to the user.
pub trait UrlRewriter: Send + Sync {
    /// Human-readable plugin name, used in error popups.
    fn name(&self) -> &str;

    /// `Ok(Some(url))` rewrites the reference payload, `Ok(None)` passes the
    /// reference to the next rewriter, `Err(message)` aborts the zap.
    fn rewrite(&self, reference: &ServiceReference) -> Result<Option<String>, String>;
}

/// The channel-list selection cursor of the UI, when a UI exists.
pub trait SelectionCursor: Send + Sync {
    /// Move the cursor to `reference`; returns whether the cursor accepted
    /// the move (the reference exists in the visible list).
    fn set_current(&self, reference: &ServiceReference, adjust: bool) -> bool;

    fn current(&self) -> Option<ServiceReference>;
}

/// User-facing notification delivery.
pub trait Notifier: Send + Sync {
    /// Show a transient error popup. `id` deduplicates repeated popups of
    /// the same origin.
    fn popup_error(&self, text: &str, id: &str);

    /// Ask the session to enter standby. `from_timer_wakeup` distinguishes
    /// a timer-driven boot from a plain startup-to-standby policy.
    fn request_standby(&self, from_timer_wakeup: bool);
}

/// Read-only view of the UI session lifecycle.
pub trait SessionMonitor: Send + Sync {
    fn in_standby(&self) -> bool;

    fn shutdown_in_progress(&self) -> bool;
}

/// One-shot channel-list import from a remote fallback receiver.
pub trait ChannelListImporter: Send + Sync {
    fn import_channels(&self);
}
