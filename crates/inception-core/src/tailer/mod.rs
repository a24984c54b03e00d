// ── Review event tailer ──
//
// Follows the controller's review log from a tick cursor. Each round pages
// forward until the controller runs dry (or the page cap is hit), orders
// the batch by (ticks, id), drops ids already delivered, hands the rest to
// the router and advances the cursor. The cursor never moves backwards.

mod dedup;

use std::sync::Arc;
use std::time::Duration;

use inception_api::{Error as ApiError, ReviewQuery};
use serde::Serialize;
use strum::Display;
use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use self::dedup::DedupWindow;
use crate::auth::AuthGate;
use crate::backoff::Backoff;
use crate::config::{CursorStart, GapPolicy, TailerConfig};
use crate::error::CoreError;
use crate::model::{Cursor, ReviewEvent};
use crate::router::{Delivery, Router, TaskOrigin};
use crate::source::ControllerSource;

/// What the tailer is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TailerStatus {
    Idle,
    Querying,
    Advancing,
    /// Waiting out a retry delay after a failed round.
    Backoff,
    /// The controller does not serve the review log to this identity.
    Disabled,
    /// Parked until credentials are replaced.
    Halted,
}

/// Result of one tailing round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailOutcome {
    /// The batch was handed to the router.
    Advanced {
        delivered: usize,
        suppressed: usize,
        duplicates: usize,
        cursor: Option<Cursor>,
    },
    /// First round under `CursorStart::Now`: history skipped, nothing delivered.
    Primed { cursor: Option<Cursor> },
    /// Another round was already in flight.
    Skipped,
    Disabled,
}

struct TailerState {
    cursor: Option<Cursor>,
    primed: bool,
    dedup: DedupWindow,
    disabled: bool,
}

/// Events collected by one round, before filtering.
struct Batch {
    events: Vec<ReviewEvent>,
    pages: usize,
}

pub(crate) struct Tailer<S> {
    source: Arc<S>,
    router: Arc<Router>,
    auth: Arc<AuthGate>,
    config: TailerConfig,
    state: Mutex<TailerState>,
    status: watch::Sender<TailerStatus>,
    cursor: watch::Sender<Option<Cursor>>,
}

impl<S: ControllerSource> Tailer<S> {
    pub(crate) fn new(
        source: Arc<S>,
        router: Arc<Router>,
        auth: Arc<AuthGate>,
        config: TailerConfig,
    ) -> Self {
        let start = config.cursor_start.initial_cursor();
        let (status, _) = watch::channel(TailerStatus::Idle);
        let (cursor, _) = watch::channel(start);
        Self {
            state: Mutex::new(TailerState {
                cursor: start,
                primed: config.cursor_start != CursorStart::Now,
                dedup: DedupWindow::new(config.dedup_window),
                disabled: false,
            }),
            source,
            router,
            auth,
            config,
            status,
            cursor,
        }
    }

    pub(crate) fn cursor(&self) -> Option<Cursor> {
        *self.cursor.borrow()
    }

    pub(crate) fn status(&self) -> watch::Receiver<TailerStatus> {
        self.status.subscribe()
    }

    fn set_status(&self, status: TailerStatus) {
        self.status.send_if_modified(|current| {
            let changed = *current != status;
            *current = status;
            changed
        });
    }

    /// Move the cursor. `None` goes back to the configured start position
    /// and forgets delivered ids. Waits for any in-flight round.
    pub(crate) async fn reset(&self, cursor: Option<Cursor>) {
        let mut state = self.state.lock().await;
        state.cursor = cursor.or_else(|| self.config.cursor_start.initial_cursor());
        state.primed = cursor.is_some() || self.config.cursor_start != CursorStart::Now;
        state.dedup.clear();
        self.cursor.send_replace(state.cursor);
        info!(cursor = ?state.cursor, "review cursor reset");
    }

    // ── Rounds ───────────────────────────────────────────────────────

    /// Run one tailing round.
    ///
    /// Nothing is committed until every page has been fetched, so a
    /// round dropped at an await point leaves the cursor untouched.
    pub(crate) async fn poll_round(&self) -> Result<TailOutcome, CoreError> {
        let Ok(mut state) = self.state.try_lock() else {
            debug!("review round already in flight, skipping");
            return Ok(TailOutcome::Skipped);
        };
        if state.disabled {
            return Ok(TailOutcome::Disabled);
        }

        self.set_status(TailerStatus::Querying);
        let batch = match self.fetch_batch(state.cursor).await {
            Ok(batch) => batch,
            Err(e) if e.is_not_found() => {
                state.disabled = true;
                self.set_status(TailerStatus::Disabled);
                warn!(error = %e, "review log not available to this identity; event tailing disabled");
                return Ok(TailOutcome::Disabled);
            }
            Err(e) => {
                if e.is_auth_expired() {
                    self.auth.trip();
                }
                return Err(e.into());
            }
        };

        self.set_status(TailerStatus::Advancing);
        let floor = state.cursor;
        let mut events = batch.events;
        events.retain(|e| floor.is_none_or(|c| e.when_ticks >= c.ticks()));
        events.sort_by(|a, b| a.order_key().cmp(&b.order_key()));
        let newest = events.last().map(|e| Cursor(e.when_ticks));
        let cursor = state.cursor.max(newest);

        if !state.primed {
            for event in &events {
                state.dedup.insert(&event.event_id);
            }
            state.primed = true;
            state.cursor = cursor;
            self.cursor.send_replace(cursor);
            self.set_status(TailerStatus::Idle);
            info!(
                cursor = ?cursor,
                skipped = events.len(),
                "review cursor positioned at newest event"
            );
            return Ok(TailOutcome::Primed { cursor });
        }

        let (mut delivered, mut suppressed, mut duplicates) = (0, 0, 0);
        for event in events {
            if !state.dedup.insert(&event.event_id) {
                duplicates += 1;
                continue;
            }
            match self.router.notify_event(Arc::new(event)) {
                Delivery::Delivered => delivered += 1,
                Delivery::Suppressed => suppressed += 1,
            }
        }

        state.cursor = cursor;
        self.cursor.send_replace(cursor);
        self.set_status(TailerStatus::Idle);
        if delivered + suppressed > 0 {
            debug!(
                delivered,
                suppressed,
                duplicates,
                pages = batch.pages,
                cursor = ?cursor,
                "review batch processed"
            );
        }
        Ok(TailOutcome::Advanced {
            delivered,
            suppressed,
            duplicates,
            cursor,
        })
    }

    async fn fetch_batch(&self, cursor: Option<Cursor>) -> Result<Batch, ApiError> {
        let policy = self.config.gap_policy;
        let page_size = self.config.page_size.max(1);
        let max_pages = self.config.max_pages.max(1);

        // Refetch asks for one tick early so events sharing the cursor's
        // tick are seen again; the dedup window drops the repeats.
        let mut reference = match policy {
            GapPolicy::Refetch => cursor.map(|c| c.ticks().saturating_sub(1)),
            GapPolicy::Partial => cursor.map(Cursor::ticks),
        };
        let mut reference_id: Option<String> = None;
        let mut events = Vec::new();
        let mut pages = 0;

        while pages < max_pages {
            let query = ReviewQuery {
                reference_time: reference,
                reference_id: reference_id.clone(),
            };
            let page = match self.source.fetch_review_page(&query).await {
                Ok(page) => page,
                Err(e) if e.is_malformed() => {
                    warn!(error = %e, "malformed review page, treating as empty");
                    Vec::new()
                }
                Err(e)
                    if pages > 0
                        && policy == GapPolicy::Partial
                        && !e.is_auth_expired()
                        && !e.is_not_found() =>
                {
                    warn!(error = %e, pages, "review pagination failed, keeping pages already fetched");
                    break;
                }
                Err(e) => return Err(e),
            };
            pages += 1;

            let full = page.len() >= page_size;
            let last = page
                .iter()
                .max_by(|a, b| (a.when_ticks, &a.id).cmp(&(b.when_ticks, &b.id)))
                .map(|e| (e.when_ticks, e.id.clone()));
            events.extend(page.into_iter().map(ReviewEvent::from));
            let Some((newest, last_id)) = last.filter(|_| full) else {
                break;
            };

            let next = match policy {
                GapPolicy::Refetch => newest.saturating_sub(1),
                GapPolicy::Partial => newest,
            };
            if Some(next) > reference {
                reference = Some(next);
                reference_id = None;
            } else if reference_id.as_ref() != Some(&last_id) {
                // A full page inside one tick: continue after its last id.
                debug!(ticks = newest, after = %last_id, "review page filled by one tick, paging by id");
                reference_id = Some(last_id);
            } else if Some(newest) > reference {
                warn!(
                    ticks = newest,
                    "controller ignored the reference id; \
                     events at this tick beyond one page may be missed"
                );
                reference = Some(newest);
                reference_id = None;
            } else {
                warn!(
                    reference = newest,
                    "review page did not move past the cursor; stopping pagination"
                );
                break;
            }
            if pages == max_pages {
                warn!(max_pages, "review page cap reached; remaining events left for the next round");
            }
        }

        Ok(Batch { events, pages })
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
                    self.set_status(TailerStatus::Halted);
                    warn!("review tailer halted until credentials are replaced");
                    self.router.notify_reauth(TaskOrigin::Tailer);
                }
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    () = self.auth.wait_cleared() => {
                        halted = false;
                        backoff.reset();
                        delay = Duration::ZERO;
                        self.set_status(TailerStatus::Idle);
                        info!("credentials replaced, review tailer resuming");
                        continue;
                    }
                }
            }

            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = self.auth.wait_required() => continue,
                () = tokio::time::sleep(delay) => {}
            }

            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                result = self.poll_round() => result,
            };

            match result {
                Ok(TailOutcome::Disabled) => break,
                Ok(_) => {
                    backoff.reset();
                    delay = backoff.delay();
                }
                Err(e) if e.is_auth() => {}
                Err(e) => {
                    delay = backoff.record_failure();
                    self.set_status(TailerStatus::Backoff);
                    warn!(error = %e, retry_in = ?delay, "review poll failed");
                }
            }
        }

        debug!("review tailer stopped");
    }
}
