//! Ordered observer registries and synchronous fan-out

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::trace;

use nav_backend::RecordHandle;

use crate::{PlaybackEvent, RecordEvent};

/// Token returned by a subscription, used to remove the observer again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type PlaybackObserver = Box<dyn Fn(PlaybackEvent) + Send + Sync>;
type RecordObserver = Box<dyn Fn(&RecordHandle, RecordEvent) + Send + Sync>;

/// Fan-out of the engine's two event streams.
///
/// Observers run synchronously on the dispatching thread, in registration
/// order. Observers must not subscribe or unsubscribe from within their own
/// callback; the registry lock is held during dispatch.
#[derive(Default)]
pub struct EventDispatcher {
    playback: Mutex<Vec<(ObserverId, PlaybackObserver)>>,
    record: Mutex<Vec<(ObserverId, RecordObserver)>>,
    next_id: AtomicU64,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> ObserverId {
        ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Register a playback observer; it will see every event dispatched
    /// after registration, ordered after all earlier observers.
    pub fn subscribe_playback<F>(&self, observer: F) -> ObserverId
    where
        F: Fn(PlaybackEvent) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.playback.lock().push((id, Box::new(observer)));
        id
    }

    pub fn subscribe_record<F>(&self, observer: F) -> ObserverId
    where
        F: Fn(&RecordHandle, RecordEvent) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.record.lock().push((id, Box::new(observer)));
        id
    }

    /// Remove an observer from whichever list holds it. Returns whether
    /// anything was removed.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut playback = self.playback.lock();
        if let Some(pos) = playback.iter().position(|(oid, _)| *oid == id) {
            playback.remove(pos);
            return true;
        }
        drop(playback);

        let mut record = self.record.lock();
        if let Some(pos) = record.iter().position(|(oid, _)| *oid == id) {
            record.remove(pos);
            return true;
        }
        false
    }

    pub fn playback_observer_count(&self) -> usize {
        self.playback.lock().len()
    }

    pub fn record_observer_count(&self) -> usize {
        self.record.lock().len()
    }

    /// Invoke every playback observer with the event, in registration order.
    pub fn dispatch_playback(&self, event: PlaybackEvent) {
        trace!(?event, "dispatching playback event");
        for (_, observer) in self.playback.lock().iter() {
            observer(event);
        }
    }

    /// Invoke every record observer, in registration order.
    pub fn dispatch_record(&self, handle: &RecordHandle, event: RecordEvent) {
        trace!(?event, recording = handle.id(), "dispatching record event");
        for (_, observer) in self.record.lock().iter() {
            observer(handle, event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nav_reference::{ServiceFlags, ServiceKind, ServiceReference};
    use std::sync::{Arc, Mutex as StdMutex};

    #[test]
    fn playback_observers_run_in_registration_order() {
        let dispatcher = EventDispatcher::new();
        let log = Arc::new(StdMutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let log = Arc::clone(&log);
            dispatcher.subscribe_playback(move |_| log.lock().unwrap().push(tag));
        }

        dispatcher.dispatch_playback(PlaybackEvent::Start);
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn unsubscribe_removes_only_the_named_observer() {
        let dispatcher = EventDispatcher::new();
        let log = Arc::new(StdMutex::new(Vec::new()));

        let keep = {
            let log = Arc::clone(&log);
            dispatcher.subscribe_playback(move |_| log.lock().unwrap().push("keep"))
        };
        let drop_id = {
            let log = Arc::clone(&log);
            dispatcher.subscribe_playback(move |_| log.lock().unwrap().push("drop"))
        };

        assert!(dispatcher.unsubscribe(drop_id));
        assert!(!dispatcher.unsubscribe(drop_id));
        dispatcher.dispatch_playback(PlaybackEvent::End);

        assert_eq!(*log.lock().unwrap(), vec!["keep"]);
        assert!(dispatcher.unsubscribe(keep));
        assert_eq!(dispatcher.playback_observer_count(), 0);
    }

    #[test]
    fn record_events_carry_the_handle() {
        let dispatcher = EventDispatcher::new();
        let seen = Arc::new(StdMutex::new(Vec::new()));

        {
            let seen = Arc::clone(&seen);
            dispatcher.subscribe_record(move |handle, event| {
                seen.lock().unwrap().push((handle.id(), event));
            });
        }

        let reference =
            ServiceReference::new(ServiceKind::Dvb, ServiceFlags::empty(), "1:0:1:445C::");
        let handle = RecordHandle::new(42, reference);
        dispatcher.dispatch_record(&handle, RecordEvent::RecordRunning);
        dispatcher.dispatch_record(&handle, RecordEvent::RecordStopped);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                (42, RecordEvent::RecordRunning),
                (42, RecordEvent::RecordStopped)
            ]
        );
    }

    #[test]
    fn record_and_playback_lists_are_independent() {
        let dispatcher = EventDispatcher::new();
        let hits = Arc::new(StdMutex::new(0u32));

        {
            let hits = Arc::clone(&hits);
            dispatcher.subscribe_record(move |_, _| *hits.lock().unwrap() += 1);
        }

        dispatcher.dispatch_playback(PlaybackEvent::Start);
        assert_eq!(*hits.lock().unwrap(), 0);
        assert_eq!(dispatcher.record_observer_count(), 1);
    }
}
