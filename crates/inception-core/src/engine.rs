// ── Engine facade ──
//
// Owns the shared client, the snapshot store, the router and both polling
// tasks for one controller. Cheaply cloneable; every clone drives the same
// tasks and state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use inception_api::{InceptionClient, TlsMode, TransportConfig};
use secrecy::SecretString;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::auth::AuthGate;
use crate::command::ControlAction;
use crate::config::{EngineConfig, SyncConfig, TlsVerification};
use crate::coordinator::{Coordinator, CoordinatorPhase, RoundOutcome};
use crate::error::CoreError;
use crate::model::{Cursor, EntityKind, EventCategory, ReviewEvent};
use crate::router::{
    CategorySwitches, ChannelListener, Listener, ListenerId, Notification, Router,
};
use crate::source::ControllerSource;
use crate::store::{Snapshot, SnapshotStore};
use crate::stream::SnapshotStream;
use crate::tailer::{TailOutcome, Tailer, TailerStatus};

/// Sync engine for one Inception controller.
///
/// Construct it, register listeners, then [`start`](Self::start) the
/// background tasks. Everything else is usable before `start` as well: the
/// one-shot [`refresh_now`](Self::refresh_now) and
/// [`poll_events_now`](Self::poll_events_now) are what the CLI uses.
pub struct Engine<S = InceptionClient> {
    inner: Arc<EngineInner<S>>,
}

impl<S> Clone for Engine<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct EngineInner<S> {
    source: Arc<S>,
    sync: SyncConfig,
    store: Arc<SnapshotStore>,
    router: Arc<Router>,
    auth: Arc<AuthGate>,
    coordinator: Arc<Coordinator<S>>,
    tailer: Arc<Tailer<S>>,
    cancel: CancellationToken,
    started: AtomicBool,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl<S> Drop for EngineInner<S> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl Engine<InceptionClient> {
    /// Build the HTTP client for `config` and wrap it in an engine.
    pub fn new(config: EngineConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: tls_to_transport(&config.tls),
            timeout: config.timeout,
        };
        let client = InceptionClient::new(config.url, config.token, &transport)?
            .with_endpoints(config.endpoints)
            .with_auth_header(config.auth_header)
            .with_review_timeout(config.review_timeout);
        Ok(Self::with_source(client, config.sync))
    }

    /// One-shot: refresh once, run `f`, shut down.
    ///
    /// No background tasks are started.
    pub async fn oneshot<F, Fut, T>(config: EngineConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Self) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let engine = Self::new(config)?;
        engine.refresh_now().await?;
        let result = f(engine.clone()).await;
        engine.shutdown().await;
        result
    }
}

impl<S: ControllerSource> Engine<S> {
    pub fn with_source(source: S, sync: SyncConfig) -> Self {
        let source = Arc::new(source);
        let store = Arc::new(SnapshotStore::new());
        let router = Arc::new(Router::new(CategorySwitches::new(
            sync.events_enabled,
            &sync.disabled_categories,
        )));
        let auth = Arc::new(AuthGate::new());
        let coordinator = Arc::new(Coordinator::new(
            Arc::clone(&source),
            Arc::clone(&store),
            Arc::clone(&router),
            Arc::clone(&auth),
            sync.refresh.clone(),
        ));
        let tailer = Arc::new(Tailer::new(
            Arc::clone(&source),
            Arc::clone(&router),
            Arc::clone(&auth),
            sync.tailer.clone(),
        ));

        Self {
            inner: Arc::new(EngineInner {
                source,
                sync,
                store,
                router,
                auth,
                coordinator,
                tailer,
                cancel: CancellationToken::new(),
                started: AtomicBool::new(false),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn source(&self) -> &Arc<S> {
        &self.inner.source
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Spawn the coordinator (when any kind is configured) and the tailer
    /// (if enabled). Both run their first round immediately. Calling this
    /// again is a no-op.
    pub async fn start(&self) {
        if self.inner.started.swap(true, Ordering::SeqCst) || self.inner.cancel.is_cancelled() {
            return;
        }

        let mut handles = self.inner.task_handles.lock().await;
        if self.inner.sync.refresh.kinds.is_empty() {
            debug!("no resource kinds configured, state refresh not started");
        } else {
            handles.push(tokio::spawn(
                Arc::clone(&self.inner.coordinator).run(self.inner.cancel.child_token()),
            ));
        }
        if self.inner.sync.tailer.enabled {
            handles.push(tokio::spawn(
                Arc::clone(&self.inner.tailer).run(self.inner.cancel.child_token()),
            ));
        } else {
            debug!("review tailing disabled by configuration");
        }
        info!(
            refresh = ?self.inner.sync.refresh.interval,
            events = ?self.inner.sync.tailer.interval,
            "engine started"
        );
    }

    /// Stop both tasks and wait for them. An in-flight round is abandoned
    /// without committing.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("engine stopped");
    }

    // ── Snapshot ─────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.store.current()
    }

    pub fn subscribe_snapshot(&self) -> SnapshotStream {
        self.inner.store.subscribe()
    }

    /// Wake the coordinator for a round now instead of at the next tick.
    pub fn trigger_immediate_refresh(&self) {
        self.inner.coordinator.trigger();
    }

    /// Run one refresh round on the calling task.
    pub async fn refresh_now(&self) -> Result<RoundOutcome, CoreError> {
        self.inner.coordinator.refresh_round().await
    }

    pub fn coordinator_phase(&self) -> watch::Receiver<CoordinatorPhase> {
        self.inner.coordinator.phase()
    }

    // ── Events ───────────────────────────────────────────────────────

    /// Run one tailing round on the calling task.
    pub async fn poll_events_now(&self) -> Result<TailOutcome, CoreError> {
        self.inner.tailer.poll_round().await
    }

    pub fn set_category_enabled(&self, category: EventCategory, enabled: bool) {
        self.inner.router.switches().set(category, enabled);
    }

    pub fn category_enabled(&self, category: EventCategory) -> bool {
        self.inner.router.switches().is_enabled(category)
    }

    pub fn set_events_enabled(&self, enabled: bool) {
        self.inner.router.switches().set_events_enabled(enabled);
    }

    pub fn events_enabled(&self) -> bool {
        self.inner.router.switches().events_enabled()
    }

    pub fn last_event(&self) -> Option<Arc<ReviewEvent>> {
        self.inner.router.last_event()
    }

    pub fn event_cursor(&self) -> Option<Cursor> {
        self.inner.tailer.cursor()
    }

    /// Restart tailing from `cursor`, or from the configured start when
    /// `None`. Waits for an in-flight round to finish first.
    pub async fn reset_event_cursor(&self, cursor: Option<Cursor>) {
        self.inner.tailer.reset(cursor).await;
    }

    pub fn tailer_status(&self) -> watch::Receiver<TailerStatus> {
        self.inner.tailer.status()
    }

    // ── Listeners ────────────────────────────────────────────────────

    pub fn register_listener(&self, listener: Arc<dyn Listener>) -> ListenerId {
        self.inner.router.register(listener)
    }

    pub fn unregister_listener(&self, id: ListenerId) -> bool {
        self.inner.router.unregister(id)
    }

    /// Register a [`ChannelListener`] and hand back its receiving end.
    pub fn channel_listener(&self) -> (ListenerId, mpsc::UnboundedReceiver<Notification>) {
        let (listener, rx) = ChannelListener::new();
        (self.register_listener(Arc::new(listener)), rx)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Send one control command and schedule a refresh to pick up its
    /// effect.
    ///
    /// Once a snapshot has been committed, ids it does not contain are
    /// rejected without contacting the controller.
    pub async fn issue_command(
        &self,
        kind: EntityKind,
        id: &str,
        action: ControlAction,
    ) -> Result<(), CoreError> {
        let request = action.to_request(kind)?;

        let snapshot = self.snapshot();
        if snapshot.generation() > 0 && !snapshot.contains(kind, id) {
            return Err(CoreError::EntityNotFound {
                kind,
                id: id.to_owned(),
            });
        }

        let result = self.inner.source.send_command(id, &request).await;
        if let Err(e) = &result {
            if e.is_auth_expired() {
                self.inner.auth.trip();
            }
        }
        result?;

        info!(%kind, id, %action, "command accepted");
        self.trigger_immediate_refresh();
        Ok(())
    }

    // ── Credentials ──────────────────────────────────────────────────

    /// Whether a task is parked waiting for new credentials.
    pub fn reauth_required(&self) -> watch::Receiver<bool> {
        self.inner.auth.subscribe()
    }

    pub fn is_reauth_required(&self) -> bool {
        self.inner.auth.is_required()
    }

    /// Swap the API token and let halted tasks resume.
    pub fn update_credentials(&self, token: SecretString) {
        self.inner.source.replace_token(token);
        if self.inner.auth.clear() {
            info!("credentials updated, resuming polling");
        } else {
            debug!("credentials updated");
        }
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
