// ── Subscription router ──
//
// Fans entity changes, review events and re-authentication signals out to
// registered listeners. Event delivery is gated by a global switch and one
// switch per category. Each listener is isolated: an error or panic in one
// is logged and the rest still receive the notification.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arc_swap::ArcSwapOption;
use dashmap::DashMap;
use serde::Serialize;
use strum::Display;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::model::{EventCategory, ReviewEvent};
use crate::store::EntityChange;

/// Handle returned by [`Router::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(Uuid);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Which polling task raised a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskOrigin {
    Coordinator,
    Tailer,
}

#[derive(Debug, Clone, Error)]
pub enum ListenerError {
    #[error("{0}")]
    Failed(String),
    /// The listener can no longer receive anything; the router drops it.
    #[error("listener disconnected")]
    Disconnected,
}

/// Receives router notifications. Every method defaults to a no-op.
///
/// Callbacks run on the polling task that produced the notification and
/// must not block.
pub trait Listener: Send + Sync {
    fn on_entity_changed(&self, _change: &EntityChange) -> Result<(), ListenerError> {
        Ok(())
    }

    fn on_event(&self, _event: &Arc<ReviewEvent>) -> Result<(), ListenerError> {
        Ok(())
    }

    fn on_reauth_required(&self, _origin: TaskOrigin) -> Result<(), ListenerError> {
        Ok(())
    }
}

/// Outcome of handing one event to the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// Dropped by the global or category switch.
    Suppressed,
}

// ── Switches ─────────────────────────────────────────────────────────

/// Global and per-category event switches. Lock-free; read on every event.
#[derive(Debug)]
pub struct CategorySwitches {
    events: AtomicBool,
    categories: [AtomicBool; 5],
}

impl CategorySwitches {
    pub fn new(events_enabled: bool, disabled: &[EventCategory]) -> Self {
        let switches = Self {
            events: AtomicBool::new(events_enabled),
            categories: std::array::from_fn(|_| AtomicBool::new(true)),
        };
        for category in disabled {
            switches.set(*category, false);
        }
        switches
    }

    fn slot(&self, category: EventCategory) -> &AtomicBool {
        let idx = match category {
            EventCategory::System => 0,
            EventCategory::Audit => 1,
            EventCategory::Access => 2,
            EventCategory::Security => 3,
            EventCategory::Hardware => 4,
        };
        &self.categories[idx]
    }

    pub fn set(&self, category: EventCategory, enabled: bool) {
        self.slot(category).store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self, category: EventCategory) -> bool {
        self.slot(category).load(Ordering::Relaxed)
    }

    pub fn set_events_enabled(&self, enabled: bool) {
        self.events.store(enabled, Ordering::Relaxed);
    }

    pub fn events_enabled(&self) -> bool {
        self.events.load(Ordering::Relaxed)
    }

    /// Both the global switch and the category's own switch are on.
    pub fn allows(&self, category: EventCategory) -> bool {
        self.events_enabled() && self.is_enabled(category)
    }
}

impl Default for CategorySwitches {
    fn default() -> Self {
        Self::new(true, &[])
    }
}

// ── Router ───────────────────────────────────────────────────────────

pub struct Router {
    listeners: DashMap<ListenerId, Arc<dyn Listener>>,
    switches: CategorySwitches,
    last_event: ArcSwapOption<ReviewEvent>,
}

impl Router {
    pub fn new(switches: CategorySwitches) -> Self {
        Self {
            listeners: DashMap::new(),
            switches,
            last_event: ArcSwapOption::const_empty(),
        }
    }

    pub fn register(&self, listener: Arc<dyn Listener>) -> ListenerId {
        let id = ListenerId(Uuid::new_v4());
        self.listeners.insert(id, listener);
        debug!(%id, "listener registered");
        id
    }

    pub fn unregister(&self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn switches(&self) -> &CategorySwitches {
        &self.switches
    }

    /// The most recent event that reached listeners.
    pub fn last_event(&self) -> Option<Arc<ReviewEvent>> {
        self.last_event.load_full()
    }

    pub fn notify_entity_changed(&self, change: &EntityChange) {
        self.dispatch("entity change", |l| l.on_entity_changed(change));
    }

    /// Deliver one event unless its category is switched off.
    pub fn notify_event(&self, event: Arc<ReviewEvent>) -> Delivery {
        if !self.switches.allows(event.category) {
            debug!(event_id = %event.event_id, category = %event.category, "event suppressed");
            return Delivery::Suppressed;
        }
        self.dispatch("review event", |l| l.on_event(&event));
        self.last_event.store(Some(event));
        Delivery::Delivered
    }

    pub fn notify_reauth(&self, origin: TaskOrigin) {
        self.dispatch("re-authentication signal", |l| l.on_reauth_required(origin));
    }

    fn dispatch<F>(&self, what: &str, f: F)
    where
        F: Fn(&dyn Listener) -> Result<(), ListenerError>,
    {
        // Snapshot first so callbacks may register or unregister freely.
        let targets: Vec<(ListenerId, Arc<dyn Listener>)> = self
            .listeners
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect();

        for (id, listener) in targets {
            match catch_unwind(AssertUnwindSafe(|| f(listener.as_ref()))) {
                Ok(Ok(())) => {}
                Ok(Err(ListenerError::Disconnected)) => {
                    debug!(%id, "listener disconnected, removing");
                    self.listeners.remove(&id);
                }
                Ok(Err(e)) => warn!(%id, error = %e, "listener failed on {what}"),
                Err(_) => warn!(%id, "listener panicked on {what}"),
            }
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(CategorySwitches::default())
    }
}

// ── Channel adapter ──────────────────────────────────────────────────

/// A router notification as an owned value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Notification {
    EntityChanged(EntityChange),
    Event(Arc<ReviewEvent>),
    ReauthRequired(TaskOrigin),
}

/// Forwards every notification into an unbounded channel, in order.
pub struct ChannelListener {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelListener {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn forward(&self, notification: Notification) -> Result<(), ListenerError> {
        self.tx
            .send(notification)
            .map_err(|_| ListenerError::Disconnected)
    }
}

impl Listener for ChannelListener {
    fn on_entity_changed(&self, change: &EntityChange) -> Result<(), ListenerError> {
        self.forward(Notification::EntityChanged(change.clone()))
    }

    fn on_event(&self, event: &Arc<ReviewEvent>) -> Result<(), ListenerError> {
        self.forward(Notification::Event(Arc::clone(event)))
    }

    fn on_reauth_required(&self, origin: TaskOrigin) -> Result<(), ListenerError> {
        self.forward(Notification::ReauthRequired(origin))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::testing::review_event;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    impl Listener for Recorder {
        fn on_event(&self, event: &Arc<ReviewEvent>) -> Result<(), ListenerError> {
            self.seen.lock().unwrap().push(event.event_id.clone());
            Ok(())
        }
    }

    struct Exploding;

    impl Listener for Exploding {
        fn on_event(&self, _event: &Arc<ReviewEvent>) -> Result<(), ListenerError> {
            panic!("listener bug");
        }
    }

    struct Failing;

    impl Listener for Failing {
        fn on_event(&self, _event: &Arc<ReviewEvent>) -> Result<(), ListenerError> {
            Err(ListenerError::Failed("host busy".into()))
        }
    }

    fn event(id: &str, code: u64) -> Arc<ReviewEvent> {
        Arc::new(review_event(id, 100, code))
    }

    #[test]
    fn delivers_in_order() {
        let router = Router::default();
        let recorder = Arc::new(Recorder::default());
        router.register(recorder.clone());

        for id in ["a", "b", "c"] {
            assert_eq!(router.notify_event(event(id, 2000)), Delivery::Delivered);
        }
        assert_eq!(*recorder.seen.lock().unwrap(), vec!["a", "b", "c"]);
        assert_eq!(router.last_event().unwrap().event_id, "c");
    }

    #[test]
    fn failing_listeners_do_not_block_others() {
        let router = Router::default();
        let recorder = Arc::new(Recorder::default());
        router.register(Arc::new(Exploding));
        router.register(Arc::new(Failing));
        router.register(recorder.clone());

        router.notify_event(event("a", 2000));
        router.notify_event(event("b", 2000));
        assert_eq!(*recorder.seen.lock().unwrap(), vec!["a", "b"]);
        assert_eq!(router.listener_count(), 3);
    }

    #[test]
    fn category_and_global_switches_gate_delivery() {
        let router = Router::new(CategorySwitches::new(true, &[EventCategory::Hardware]));
        let recorder = Arc::new(Recorder::default());
        router.register(recorder.clone());

        assert_eq!(router.notify_event(event("hw", 10_000)), Delivery::Suppressed);
        assert_eq!(router.notify_event(event("acc", 2000)), Delivery::Delivered);

        router.switches().set_events_enabled(false);
        assert_eq!(router.notify_event(event("acc2", 2000)), Delivery::Suppressed);

        router.switches().set_events_enabled(true);
        router.switches().set(EventCategory::Hardware, true);
        assert_eq!(router.notify_event(event("hw2", 10_000)), Delivery::Delivered);

        assert_eq!(*recorder.seen.lock().unwrap(), vec!["acc", "hw2"]);
        assert_eq!(router.last_event().unwrap().event_id, "hw2");
    }

    #[test]
    fn closed_channel_listener_is_dropped() {
        let router = Router::default();
        let (listener, rx) = ChannelListener::new();
        router.register(Arc::new(listener));
        drop(rx);

        router.notify_reauth(TaskOrigin::Tailer);
        assert_eq!(router.listener_count(), 0);
    }

    #[test]
    fn channel_listener_forwards_everything() {
        let router = Router::default();
        let (listener, mut rx) = ChannelListener::new();
        let id = router.register(Arc::new(listener));

        router.notify_event(event("a", 1));
        router.notify_reauth(TaskOrigin::Coordinator);

        assert!(matches!(rx.try_recv().unwrap(), Notification::Event(e) if e.event_id == "a"));
        assert_eq!(
            rx.try_recv().unwrap(),
            Notification::ReauthRequired(TaskOrigin::Coordinator)
        );

        assert!(router.unregister(id));
        router.notify_event(event("b", 1));
        assert!(rx.try_recv().is_err());
    }
}
