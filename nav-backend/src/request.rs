//! Play requests, resumption tokens and retry tickets

use nav_reference::ServiceReference;
use serde::{Deserialize, Serialize};

/// A single zap request with all the knobs the transition engine honours.
///
/// The plain constructor gives the defaults of an ordinary channel change:
/// parental control checked, no forced restart, UI cursor adjusted, stream
/// relay substitution applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayRequest {
    pub reference: ServiceReference,
    pub check_parental: bool,
    pub force_restart: bool,
    pub adjust_cursor: bool,
    pub ignore_stream_relay: bool,
    /// Set when this request replays the concrete member of a group so the
    /// cached "service or group" field still names the original group.
    pub origin_group: Option<ServiceReference>,
}

impl PlayRequest {
    pub fn new(reference: ServiceReference) -> Self {
        Self {
            reference,
            check_parental: true,
            force_restart: false,
            adjust_cursor: true,
            ignore_stream_relay: false,
            origin_group: None,
        }
    }

    pub fn force_restart(mut self) -> Self {
        self.force_restart = true;
        self
    }

    pub fn without_parental_check(mut self) -> Self {
        self.check_parental = false;
        self
    }

    pub fn without_cursor_adjust(mut self) -> Self {
        self.adjust_cursor = false;
        self
    }

    pub fn ignoring_stream_relay(mut self) -> Self {
        self.ignore_stream_relay = true;
        self
    }

    pub fn with_origin_group(mut self, group: ServiceReference) -> Self {
        self.origin_group = Some(group);
        self
    }

    /// Token handed to the parental-control gate: the same request with the
    /// check disabled, so an authenticated user can resume the transition.
    pub fn resume_handle(&self) -> ResumeHandle {
        ResumeHandle(self.clone().without_parental_check())
    }
}

/// Resumable-transition token.
///
/// Captures the original zap arguments with parental checking disabled. The
/// parental-control collaborator holds on to it while the user authenticates
/// and hands it back through `Navigation::resume`, either synchronously or
/// from the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeHandle(PlayRequest);

impl ResumeHandle {
    pub fn request(&self) -> &PlayRequest {
        &self.0
    }

    pub fn into_request(self) -> PlayRequest {
        self.0
    }
}

/// A scheduled re-attempt of a failed or deferred transition.
///
/// The generation is sampled when the retry is scheduled; a fired ticket
/// whose generation no longer matches the engine's current one is stale
/// (another transition superseded it) and must be dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryTicket {
    pub generation: u64,
    pub request: PlayRequest,
}
