// ── State coordinator ──
//
// Periodically fetches every configured resource kind, converts the
// results and commits them as one snapshot. A round either commits a
// complete snapshot or leaves the previous one in place.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use inception_api::{Error as ApiError, RawSummaryEntry};
use serde::Serialize;
use strum::Display;
use tokio::sync::{Mutex, Notify, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::auth::AuthGate;
use crate::backoff::Backoff;
use crate::config::RefreshConfig;
use crate::convert::entity_from_raw;
use crate::error::CoreError;
use crate::model::EntityKind;
use crate::router::{Router, TaskOrigin};
use crate::source::ControllerSource;
use crate::store::SnapshotStore;

/// Phase of the most recent refresh round.
///
/// `Committed` and `Failed` persist until the next round starts so that
/// watchers can observe them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CoordinatorPhase {
    Idle,
    Fetching,
    Committed,
    Failed,
}

/// Result of one refresh round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    Committed {
        generation: u64,
        entities: usize,
        changed: usize,
        removed: usize,
    },
    /// Another round was already in flight.
    Skipped,
}

pub(crate) struct Coordinator<S> {
    source: Arc<S>,
    store: Arc<SnapshotStore>,
    router: Arc<Router>,
    auth: Arc<AuthGate>,
    config: RefreshConfig,
    in_flight: Mutex<()>,
    /// Kinds currently answered with "not available", for one-shot warnings.
    unavailable: std::sync::Mutex<BTreeSet<EntityKind>>,
    phase: watch::Sender<CoordinatorPhase>,
    trigger: Notify,
}

impl<S: ControllerSource> Coordinator<S> {
    pub(crate) fn new(
        source: Arc<S>,
        store: Arc<SnapshotStore>,
        router: Arc<Router>,
        auth: Arc<AuthGate>,
        config: RefreshConfig,
    ) -> Self {
        let (phase, _) = watch::channel(CoordinatorPhase::Idle);
        Self {
            source,
            store,
            router,
            auth,
            config,
            in_flight: Mutex::new(()),
            unavailable: std::sync::Mutex::new(BTreeSet::new()),
            phase,
            trigger: Notify::new(),
        }
    }

    pub(crate) fn phase(&self) -> watch::Receiver<CoordinatorPhase> {
        self.phase.subscribe()
    }

    /// Wake the background loop for an early round.
    pub(crate) fn trigger(&self) {
        self.trigger.notify_one();
    }

    /// Run one refresh round.
    pub(crate) async fn refresh_round(&self) -> Result<RoundOutcome, CoreError> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            debug!("refresh already in flight, skipping");
            return Ok(RoundOutcome::Skipped);
        };
        self.phase.send_replace(CoordinatorPhase::Fetching);

        let fetches = self.config.kinds.iter().map(|&kind| async move {
            let result = self.source.fetch_kind(kind).await;
            (kind, result)
        });
        let results = join_all(fetches).await;

        if let Some(e) = first_fatal(&results) {
            if e.is_auth_expired() {
                self.auth.trip();
            }
            self.phase.send_replace(CoordinatorPhase::Failed);
            return Err(e.clone().into());
        }

        let mut entities = BTreeMap::new();
        for (kind, result) in results {
            let Some(raws) = self.available(kind, result) else {
                continue;
            };
            for raw in raws {
                let record = entity_from_raw(kind, raw);
                let key = record.key();
                if entities.contains_key(&key) {
                    warn!(%key, "duplicate entity id in summary, keeping the first");
                    continue;
                }
                entities.insert(key, Arc::new(record));
            }
        }

        let (snapshot, changes) = self.store.commit(entities);
        let removed = changes.iter().filter(|c| c.is_removal()).count();
        for change in &changes {
            self.router.notify_entity_changed(change);
        }
        self.phase.send_replace(CoordinatorPhase::Committed);

        debug!(
            generation = snapshot.generation(),
            entities = snapshot.len(),
            changed = changes.len() - removed,
            removed,
            "snapshot committed"
        );
        Ok(RoundOutcome::Committed {
            generation: snapshot.generation(),
            entities: snapshot.len(),
            changed: changes.len() - removed,
            removed,
        })
    }

    /// Entries for `kind`, or `None` when the kind could not be read this
    /// round and should count as empty.
    fn available(
        &self,
        kind: EntityKind,
        result: Result<Vec<RawSummaryEntry>, ApiError>,
    ) -> Option<Vec<RawSummaryEntry>> {
        let mut unavailable = self
            .unavailable
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match result {
            Ok(raws) => {
                if unavailable.remove(&kind) {
                    info!(%kind, "resource kind available again");
                }
                Some(raws)
            }
            Err(e) => {
                if unavailable.insert(kind) {
                    if e.is_not_found() {
                        warn!(%kind, error = %e, "resource kind unavailable, treating as empty");
                    } else if e.is_malformed() {
                        warn!(%kind, error = %e, "resource kind returned malformed data, treating as empty");
                    } else {
                        warn!(%kind, error = %e, "resource kind request refused, treating as empty");
                    }
                }
                None
            }
        }
    }

    // ── Background loop ──────────────────────────────────────────────

    pub(crate) async fn run(self: Arc<Self>, cancel: CancellationToken) {
        let mut backoff = Backoff::new(self.config.interval, self.config.max_backoff);
        let mut delay = Duration::ZERO;
        let mut halted = false;

        loop {
            if self.auth.is_required() {
                if !halted {
                    halted = true;
                    warn!("state refresh halted until credentials are replaced");
                    self.router.notify_reauth(TaskOrigin::Coordinator);
                }
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    () = self.auth.wait_cleared() => {
                        halted = false;
                        backoff.reset();
                        delay = Duration::ZERO;
                        info!("credentials replaced, state refresh resuming");
                        continue;
                    }
                }
            }

            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = self.auth.wait_required() => continue,
                () = self.trigger.notified() => debug!("immediate refresh requested"),
                () = tokio::time::sleep(delay) => {}
            }

            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                result = self.refresh_round() => result,
            };

            match result {
                Ok(_) => {
                    backoff.reset();
                    delay = backoff.delay();
                }
                Err(e) if e.is_auth() => {}
                Err(e) => {
                    delay = backoff.record_failure();
                    warn!(error = %e, retry_in = ?delay, "state refresh failed");
                }
            }
        }

        debug!("state coordinator stopped");
    }
}

type KindResult = (EntityKind, Result<Vec<RawSummaryEntry>, ApiError>);

/// The error that aborts a round, if any. Only transient and
/// authentication failures do; an authentication failure wins.
fn first_fatal(results: &[KindResult]) -> Option<&ApiError> {
    let fatal = || {
        results
            .iter()
            .filter_map(|(_, r)| r.as_ref().err())
            .filter(|e| e.is_transient() || e.is_auth_expired())
    };
    fatal()
        .find(|e| e.is_auth_expired())
        .or_else(|| fatal().next())
}
