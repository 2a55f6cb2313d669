//! The navigation facade and its play-transition engine

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use nav_backend::{
    ChannelListImporter, CiAlternativeResolver, DeferredAction, LiveService, Notifier,
    ParentalControl, PlayRequest, PlaybackBackend, RecordHandle, ResumeHandle, RetryTicket,
    Scheduler, SelectionCursor, SessionMonitor, StreamRelay, UrlRewriter,
};
use nav_events::{EventDispatcher, PlaybackEvent, RecordEvent};
use nav_reference::{ServiceKind, ServiceReference};

use crate::config::NavigationConfig;
use crate::error::{NavError, Result};
use crate::resolve;
use crate::startup::{self, StartupReport};
use crate::state::NavigationState;

/// Popup deduplication id for URL-rewrite failures.
const REWRITE_POPUP_ID: &str = "zap-rewrite-error";

/// Only one Navigation may be alive per process; aliasing the cached playing
/// state would desynchronize it from the engine.
static INSTANCE_ALIVE: AtomicBool = AtomicBool::new(false);

/// Result of a play transition.
///
/// The facade intentionally collapses "ignored because already playing" and
/// "blocked by policy" into the same non-fatal code for callers that only
/// look at [`PlayOutcome::code`]; the enum keeps them distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The engine accepted the start call.
    Started,
    /// The requested reference is already playing and no restart was forced.
    AlreadyPlaying,
    /// Parental control or a rewrite plugin vetoed the transition.
    Rejected,
    /// A none request stopped playback.
    Stopped,
    /// The group had no playable member and no best-effort candidate;
    /// nothing is playing now.
    NothingPlayable,
    /// The transition was deferred; a retry of the same request is
    /// scheduled.
    Deferred,
    /// The engine refused the start and no retry applies.
    StartFailed,
}

impl PlayOutcome {
    /// The original collapsed status contract: 0 for anything the caller
    /// should treat as handled, 1 for ignored/vetoed requests.
    pub fn code(self) -> i32 {
        match self {
            PlayOutcome::AlreadyPlaying | PlayOutcome::Rejected => 1,
            _ => 0,
        }
    }
}

/// The service-navigation facade.
///
/// Owns the cached notion of "currently playing", sequences zap requests
/// through the policy pipeline into the playback engine, and republishes the
/// engine's lifecycle events to registered observers. Construct through
/// [`Navigation::builder`]; a second live instance is refused.
///
/// All engine operations run on one control thread; deferred work re-enters
/// through [`Navigation::run_deferred`] from the event loop.
pub struct Navigation {
    backend: Arc<dyn PlaybackBackend>,
    scheduler: Arc<dyn Scheduler>,
    dispatcher: EventDispatcher,
    parental: Option<Arc<dyn ParentalControl>>,
    relay: Option<Arc<dyn StreamRelay>>,
    ci_resolver: Option<Arc<dyn CiAlternativeResolver>>,
    rewriters: Vec<Arc<dyn UrlRewriter>>,
    cursor: Option<Arc<dyn SelectionCursor>>,
    notifier: Option<Arc<dyn Notifier>>,
    session: Option<Arc<dyn SessionMonitor>>,
    config: NavigationConfig,
    state: Mutex<NavigationState>,
    startup: StartupReport,
}

/// Builder for [`Navigation`]; the playback engine and the scheduler are
/// mandatory, every policy hook is optional and absent hooks are permissive.
pub struct NavigationBuilder {
    backend: Arc<dyn PlaybackBackend>,
    scheduler: Arc<dyn Scheduler>,
    config: NavigationConfig,
    parental: Option<Arc<dyn ParentalControl>>,
    relay: Option<Arc<dyn StreamRelay>>,
    ci_resolver: Option<Arc<dyn CiAlternativeResolver>>,
    rewriters: Vec<Arc<dyn UrlRewriter>>,
    cursor: Option<Arc<dyn SelectionCursor>>,
    notifier: Option<Arc<dyn Notifier>>,
    session: Option<Arc<dyn SessionMonitor>>,
    importer: Option<Arc<dyn ChannelListImporter>>,
    was_timer_wakeup: bool,
}

impl NavigationBuilder {
    pub fn config(mut self, config: NavigationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn parental_control(mut self, parental: Arc<dyn ParentalControl>) -> Self {
        self.parental = Some(parental);
        self
    }

    pub fn stream_relay(mut self, relay: Arc<dyn StreamRelay>) -> Self {
        self.relay = Some(relay);
        self
    }

    pub fn ci_resolver(mut self, resolver: Arc<dyn CiAlternativeResolver>) -> Self {
        self.ci_resolver = Some(resolver);
        self
    }

    /// Append a rewriter to the plugin chain; chain order is call order.
    pub fn url_rewriter(mut self, rewriter: Arc<dyn UrlRewriter>) -> Self {
        self.rewriters.push(rewriter);
        self
    }

    pub fn selection_cursor(mut self, cursor: Arc<dyn SelectionCursor>) -> Self {
        self.cursor = Some(cursor);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn session_monitor(mut self, session: Arc<dyn SessionMonitor>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn channel_list_importer(mut self, importer: Arc<dyn ChannelListImporter>) -> Self {
        self.importer = Some(importer);
        self
    }

    /// Mark this boot as a timer-triggered wakeup from deep standby (read
    /// from the front processor by the caller).
    pub fn timer_wakeup(mut self, was_timer_wakeup: bool) -> Self {
        self.was_timer_wakeup = was_timer_wakeup;
        self
    }

    /// Run the one-time startup decisions and build the facade.
    ///
    /// # Errors
    ///
    /// [`NavError::AlreadyConstructed`] when another Navigation is alive.
    pub fn build(self) -> Result<Navigation> {
        if INSTANCE_ALIVE
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(NavError::AlreadyConstructed);
        }

        let startup = startup::run(
            &self.config,
            self.was_timer_wakeup,
            self.importer.as_ref(),
            &self.scheduler,
            self.session.as_ref(),
        );

        Ok(Navigation {
            backend: self.backend,
            scheduler: self.scheduler,
            dispatcher: EventDispatcher::new(),
            parental: self.parental,
            relay: self.relay,
            ci_resolver: self.ci_resolver,
            rewriters: self.rewriters,
            cursor: self.cursor,
            notifier: self.notifier,
            session: self.session,
            config: self.config,
            state: Mutex::new(NavigationState::new()),
            startup,
        })
    }
}

impl Drop for Navigation {
    fn drop(&mut self) {
        INSTANCE_ALIVE.store(false, Ordering::SeqCst);
    }
}

impl Navigation {
    pub fn builder(
        backend: Arc<dyn PlaybackBackend>,
        scheduler: Arc<dyn Scheduler>,
    ) -> NavigationBuilder {
        NavigationBuilder {
            backend,
            scheduler,
            config: NavigationConfig::default(),
            parental: None,
            relay: None,
            ci_resolver: None,
            rewriters: Vec::new(),
            cursor: None,
            notifier: None,
            session: None,
            importer: None,
            was_timer_wakeup: false,
        }
    }

    // ======================================================================
    // Play transitions
    // ======================================================================

    /// Play a service; `None` means stop.
    pub fn play(&self, reference: Option<ServiceReference>) -> PlayOutcome {
        match reference {
            Some(reference) => self.play_with(PlayRequest::new(reference)),
            None => {
                self.stop();
                PlayOutcome::Stopped
            }
        }
    }

    /// Run a full play transition.
    ///
    /// Resolution, policy pipeline and engine call happen synchronously;
    /// transient failures and the relay-switch delay come back later through
    /// [`Navigation::run_deferred`].
    pub fn play_with(&self, request: PlayRequest) -> PlayOutcome {
        let old_group = {
            let mut st = self.state.lock();
            // Supersede any pending retry before anything else.
            st.retry_generation = st.retry_generation.wrapping_add(1);
            st.playing_ref_or_group.clone()
        };

        if !request.force_restart && old_group.as_ref() == Some(&request.reference) {
            debug!(reference = %request.reference, "ignoring request to play the running service");
            return PlayOutcome::AlreadyPlaying;
        }

        info!(reference = %request.reference, "playing");

        // Gate against the possibly-abstract reference before resolving.
        if request.check_parental
            && !self.parental_allows(&request.reference, request.resume_handle())
        {
            if let Some(previous) = old_group {
                let mut st = self.state.lock();
                self.restore_cursor(&previous, request.adjust_cursor, &mut st);
            }
            return PlayOutcome::Rejected;
        }

        if request.reference.is_group() {
            self.play_group(&request, old_group.as_ref())
        } else {
            self.play_concrete(&request, request.reference.clone(), old_group.as_ref())
        }
    }

    /// Re-enter a transition that a policy gate suspended.
    pub fn resume(&self, handle: ResumeHandle) -> PlayOutcome {
        self.play_with(handle.into_request())
    }

    /// Replay the original request (group included) with a forced restart.
    pub fn restart(&self) -> PlayOutcome {
        let playing = self.state.lock().playing_ref_or_group.clone();
        match playing {
            Some(reference) => self.play_with(PlayRequest::new(reference).force_restart()),
            None => {
                self.stop();
                PlayOutcome::Stopped
            }
        }
    }

    /// Stop playback and clear the cached reference pair.
    pub fn stop(&self) {
        debug!("stopping playback");
        self.backend.stop();
        self.state.lock().clear_playing_refs();
    }

    pub fn pause(&self, paused: bool) {
        self.backend.pause(paused);
    }

    fn play_group(
        &self,
        request: &PlayRequest,
        old_group: Option<&ServiceReference>,
    ) -> PlayOutcome {
        let hint = self
            .state
            .lock()
            .playing_ref
            .clone()
            .unwrap_or_default();

        let mut relayed = false;
        let resolved = resolve::resolve_group(self.backend.as_ref(), &request.reference, &hint);

        let candidate = match resolved {
            Some(candidate) => {
                let candidate = if request.ignore_stream_relay {
                    candidate
                } else {
                    let (candidate, was_relayed) = self.apply_stream_relay(candidate);
                    relayed = was_relayed;
                    candidate
                };

                let candidate = if !relayed
                    && self.config.use_ci_assignment
                    && !self.backend.is_playable_for(&candidate, &hint)
                {
                    self.resolve_ci_alternative(&request.reference, candidate)
                } else {
                    candidate
                };

                if relayed {
                    Some(candidate)
                } else {
                    match self.apply_url_rewriters(candidate) {
                        Ok(candidate) => Some(candidate),
                        Err(()) => return PlayOutcome::Rejected,
                    }
                }
            }
            None => None,
        };

        debug!(group = %request.reference, candidate = ?candidate, "group resolved");

        // No-op guard again, now against the resolved concrete reference.
        let playing = self.state.lock().playing_ref.clone();
        if !request.force_restart && candidate.is_some() && candidate == playing {
            debug!("ignoring request to play the running service after resolution");
            return PlayOutcome::AlreadyPlaying;
        }

        let Some(candidate) = candidate else {
            return self.play_fallback(request);
        };

        // Second gate, this time against the concrete member. The resume
        // token captures the resolved candidate (not the group, which could
        // resolve differently later) and remembers the group so the cache
        // still names it afterwards.
        if request.check_parental {
            let resume_request = PlayRequest {
                reference: candidate.clone(),
                ..request.clone()
            }
            .with_origin_group(request.reference.clone());
            if !self.parental_allows(&candidate, resume_request.resume_handle()) {
                let mut st = self.state.lock();
                if let Some(previous) = st.playing_ref_or_group.clone() {
                    self.restore_cursor(&previous, request.adjust_cursor, &mut st);
                }
                return PlayOutcome::Rejected;
            }
        }

        self.play_concrete(request, candidate, old_group)
    }

    /// Nothing in the group is playable: stop, then try the last-resort
    /// resolution as a best-effort start.
    fn play_fallback(&self, request: &PlayRequest) -> PlayOutcome {
        let previous = self.state.lock().playing_ref.clone();
        let fallback =
            resolve::resolve_group_ignoring_previous(self.backend.as_ref(), &request.reference);
        self.stop();

        let Some(alternative) = fallback else {
            debug!(group = %request.reference, "no playable member, nothing playing now");
            return PlayOutcome::NothingPlayable;
        };

        {
            let mut st = self.state.lock();
            st.commit(alternative.clone(), request.reference.clone());
        }

        if let Err(err) = self.backend.play(&alternative) {
            warn!(reference = %alternative, %err, "failed to start best-effort candidate");
            self.state.lock().clear_playing_refs();
            if previous.as_ref().is_some_and(|p| self.was_streaming(p)) {
                // The engine frees a streamed tuner asynchronously; retry
                // the whole original request shortly.
                self.schedule_retry(request.clone(), self.config.retry_delay);
                return PlayOutcome::Deferred;
            }
            return PlayOutcome::StartFailed;
        }

        debug!(reference = %alternative, "best-effort candidate started");
        PlayOutcome::Started
    }

    fn play_concrete(
        &self,
        request: &PlayRequest,
        concrete: ServiceReference,
        old_group: Option<&ServiceReference>,
    ) -> PlayOutcome {
        // Engine-mandated ordering: stop before start.
        self.backend.stop();

        let mut playref = concrete.clone();
        let mut relayed = false;
        if !request.ignore_stream_relay {
            let (substituted, was_relayed) = self.apply_stream_relay(playref);
            playref = substituted;
            relayed = was_relayed;
        }
        if !relayed {
            playref = match self.apply_url_rewriters(playref) {
                Ok(playref) => playref,
                Err(()) => return PlayOutcome::Rejected,
            };
        }

        {
            let mut st = self.state.lock();
            let or_group = request
                .origin_group
                .clone()
                .filter(|group| group.is_group() && !request.reference.is_group())
                .unwrap_or_else(|| request.reference.clone());
            st.commit(playref.clone(), or_group);
            if let Some(cursor) = &self.cursor {
                if cursor.set_current(&request.reference, request.adjust_cursor) {
                    st.playing_ref_or_group = cursor.current();
                }
            }
        }

        // Classification runs on the pre-substitution reference; the relay
        // URL would hide the broadcast type.
        let tuner_overridden = self.apply_tuner_priority(&concrete);

        if let Some(configured_delay) = self.config.stream_relay_delay {
            let mut st = self.state.lock();
            if st.stream_relay_active {
                st.stream_relay_active = false;
                st.clear_playing_refs();
                let delay = if st.first_start {
                    self.config.first_stream_relay_delay
                } else {
                    configured_delay
                };
                st.first_start = false;
                drop(st);
                info!(?delay, "stream relay was active, deferring zap until the tuner is freed");
                if tuner_overridden {
                    self.restore_default_tuner();
                }
                self.schedule_retry(request.clone(), delay);
                return PlayOutcome::Deferred;
            }
        }

        let outcome = match self.backend.play(&playref) {
            Ok(()) => {
                self.state.lock().stream_relay_active = relayed;
                PlayOutcome::Started
            }
            Err(err) => {
                warn!(reference = %playref, %err, "failed to start");
                let mut st = self.state.lock();
                st.clear_playing_refs();
                st.stream_relay_active = false;
                drop(st);
                if old_group.is_some_and(|p| self.was_streaming(p)) {
                    self.schedule_retry(request.clone(), self.config.retry_delay);
                    PlayOutcome::Deferred
                } else {
                    PlayOutcome::StartFailed
                }
            }
        };

        if tuner_overridden {
            self.restore_default_tuner();
        }
        outcome
    }

    // ======================================================================
    // Policy helpers
    // ======================================================================

    fn parental_allows(&self, reference: &ServiceReference, resume: ResumeHandle) -> bool {
        match &self.parental {
            Some(parental) => parental.is_service_playable(reference, resume),
            None => true,
        }
    }

    fn apply_stream_relay(&self, reference: ServiceReference) -> (ServiceReference, bool) {
        match &self.relay {
            Some(relay) => relay.substitute(reference),
            None => (reference, false),
        }
    }

    fn resolve_ci_alternative(
        &self,
        group: &ServiceReference,
        candidate: ServiceReference,
    ) -> ServiceReference {
        match &self.ci_resolver {
            Some(resolver) => match resolver.resolve_alternative(group, &candidate) {
                Some(alternative) => {
                    debug!(from = %candidate, to = %alternative, "CI alternative substituted");
                    alternative
                }
                None => candidate,
            },
            None => candidate,
        }
    }

    /// First rewriter returning a URL wins; an error aborts the transition
    /// with a popup, without touching the engine.
    fn apply_url_rewriters(&self, reference: ServiceReference) -> std::result::Result<ServiceReference, ()> {
        if reference.path().is_empty() {
            return Ok(reference);
        }
        for rewriter in &self.rewriters {
            match rewriter.rewrite(&reference) {
                Ok(Some(url)) => {
                    debug!(plugin = rewriter.name(), %url, "service URL rewritten");
                    return Ok(reference.with_path(url));
                }
                Ok(None) => {}
                Err(message) => {
                    warn!(plugin = rewriter.name(), %message, "URL rewrite failed");
                    if let Some(notifier) = &self.notifier {
                        let text =
                            format!("Error getting link via {}\n{}", rewriter.name(), message);
                        notifier.popup_error(&text, REWRITE_POPUP_ID);
                    }
                    return Err(());
                }
            }
        }
        Ok(reference)
    }

    /// Apply the per-delivery tuner preference; returns whether the global
    /// default has to be restored after the start attempt.
    fn apply_tuner_priority(&self, reference: &ServiceReference) -> bool {
        if !reference.is_live_broadcast() {
            return false;
        }
        let Some(delivery) = self.backend.classify_delivery(reference) else {
            return false;
        };
        let Some(slot) = self.config.tuner_priority.override_for(delivery) else {
            return false;
        };
        if slot == self.config.tuner_priority.default_slot {
            return false;
        }
        debug!(%delivery, slot, "overriding preferred tuner");
        self.backend.set_preferred_tuner(slot);
        true
    }

    fn restore_default_tuner(&self) {
        self.backend
            .set_preferred_tuner(self.config.tuner_priority.default_slot);
    }

    fn was_streaming(&self, reference: &ServiceReference) -> bool {
        reference.is_stream_url()
            || self
                .relay
                .as_ref()
                .is_some_and(|relay| relay.is_relay_service(reference))
    }

    fn restore_cursor(
        &self,
        previous: &ServiceReference,
        adjust: bool,
        st: &mut NavigationState,
    ) {
        if let Some(cursor) = &self.cursor {
            if cursor.set_current(previous, adjust) {
                st.playing_ref_or_group = cursor.current();
            }
        }
    }

    // ======================================================================
    // Deferred work
    // ======================================================================

    fn schedule_retry(&self, request: PlayRequest, delay: Duration) {
        let generation = self.state.lock().retry_generation;
        debug!(?delay, generation, "scheduling zap retry");
        self.scheduler
            .schedule(delay, DeferredAction::RetryPlay(RetryTicket { generation, request }));
    }

    /// Event-loop re-entry point for fired timers.
    ///
    /// Retry tickets are checked for staleness: any transition initiated
    /// after the ticket was scheduled supersedes it.
    pub fn run_deferred(&self, action: DeferredAction) {
        match action {
            DeferredAction::RetryPlay(ticket) => {
                let current = self.state.lock().retry_generation;
                if ticket.generation != current {
                    debug!(
                        ticket = ticket.generation,
                        current, "dropping stale zap retry"
                    );
                    return;
                }
                self.play_with(ticket.request);
            }
            DeferredAction::EnterStandby => self.enter_standby_if_idle(),
        }
    }

    fn enter_standby_if_idle(&self) {
        let blocked = self
            .session
            .as_ref()
            .is_some_and(|session| session.in_standby() || session.shutdown_in_progress());
        if blocked {
            debug!("standby entry skipped, session is busy");
            return;
        }
        if let Some(notifier) = &self.notifier {
            notifier.request_standby(self.startup.wakeup_timer_enabled);
        }
    }

    // ======================================================================
    // Events
    // ======================================================================

    /// Observer registration for both event streams.
    pub fn events(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    /// Fan a playback event out to observers, then apply the dispatcher's
    /// own end-of-playback handling: observers still see the expiring
    /// cached references during their invocation.
    pub fn dispatch_event(&self, event: PlaybackEvent) {
        self.dispatcher.dispatch_playback(event);
        if event == PlaybackEvent::End {
            self.state.lock().clear_all();
        }
    }

    /// Fan a record event out to observers; record events never mutate the
    /// playing-state cache.
    pub fn dispatch_record_event(&self, handle: &RecordHandle, event: RecordEvent) {
        self.dispatcher.dispatch_record(handle, event);
    }

    // ======================================================================
    // Accessors
    // ======================================================================

    /// The concrete reference actually handed to the engine, if playing.
    pub fn currently_playing_service_reference(&self) -> Option<ServiceReference> {
        self.state.lock().playing_ref.clone()
    }

    /// The reference the caller originally asked for (possibly a group).
    pub fn currently_playing_service_or_group(&self) -> Option<ServiceReference> {
        self.state.lock().playing_ref_or_group.clone()
    }

    /// Whether the active service plays through the stream relay.
    pub fn is_stream_relay_active(&self) -> bool {
        self.state.lock().stream_relay_active
    }

    /// Live handle to the running service, fetched lazily and cached until
    /// end of playback.
    pub fn current_service(&self) -> Option<Arc<dyn LiveService>> {
        let mut st = self.state.lock();
        if st.live_service.is_none() {
            st.live_service = self.backend.current_service();
        }
        st.live_service.clone()
    }

    /// The reference the engine reports for the running service.
    pub fn current_service_reference(&self) -> Option<ServiceReference> {
        self.current_service()
            .and_then(|service| service.service_reference())
    }

    /// Whether the running service is an IPTV stream rather than a
    /// broadcast or a local recording.
    pub fn is_current_service_iptv(&self) -> bool {
        self.current_service_reference().is_some_and(|reference| {
            !reference.path().is_empty()
                && !reference.path().starts_with('/')
                && matches!(reference.kind(), ServiceKind::Dvb | ServiceKind::Stream)
        })
    }

    pub fn was_timer_wakeup(&self) -> bool {
        self.startup.was_timer_wakeup
    }

    pub fn is_restart_ui(&self) -> bool {
        self.startup.is_restart_ui
    }

    pub fn prev_wakeup_time(&self) -> Option<u64> {
        self.startup.prev_wakeup_time
    }

    pub(crate) fn backend(&self) -> &Arc<dyn PlaybackBackend> {
        &self.backend
    }

    pub(crate) fn relay(&self) -> Option<&Arc<dyn StreamRelay>> {
        self.relay.as_ref()
    }
}
