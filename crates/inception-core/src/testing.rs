// Test doubles shared by the engine's unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use inception_api::{
    ActivityRequest, Error as ApiError, RawReviewEvent, RawSummaryEntry, ReviewQuery,
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tokio::sync::Notify;

use crate::model::{EntityKind, ReviewEvent};
use crate::source::ControllerSource;

type Scripted<T> = VecDeque<Result<T, ApiError>>;

/// A controller that answers from queued responses.
///
/// Summary queues are sticky: the last response for a kind repeats. The
/// review queue drains to empty pages. Every call is recorded.
#[derive(Default)]
pub(crate) struct ScriptedSource {
    summaries: Mutex<HashMap<EntityKind, Scripted<Vec<RawSummaryEntry>>>>,
    reviews: Mutex<Scripted<Vec<RawReviewEvent>>>,
    command_results: Mutex<Scripted<()>>,
    review_queries: Mutex<Vec<ReviewQuery>>,
    commands: Mutex<Vec<(String, ActivityRequest)>>,
    tokens: Mutex<Vec<String>>,
    summary_calls: AtomicUsize,
    hold: Mutex<Option<Arc<Notify>>>,
}

impl ScriptedSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_summary(&self, kind: EntityKind, response: Result<Vec<RawSummaryEntry>, ApiError>) {
        self.summaries
            .lock()
            .unwrap()
            .entry(kind)
            .or_default()
            .push_back(response);
    }

    pub(crate) fn push_review(&self, response: Result<Vec<RawReviewEvent>, ApiError>) {
        self.reviews.lock().unwrap().push_back(response);
    }

    pub(crate) fn push_command_result(&self, response: Result<(), ApiError>) {
        self.command_results.lock().unwrap().push_back(response);
    }

    /// Make summary fetches wait until the returned `Notify` fires.
    pub(crate) fn hold_summaries(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.hold.lock().unwrap() = Some(Arc::clone(&notify));
        notify
    }

    pub(crate) fn release_summaries(&self) {
        if let Some(notify) = self.hold.lock().unwrap().take() {
            notify.notify_waiters();
        }
    }

    pub(crate) fn review_queries(&self) -> Vec<ReviewQuery> {
        self.review_queries.lock().unwrap().clone()
    }

    pub(crate) fn commands(&self) -> Vec<(String, ActivityRequest)> {
        self.commands.lock().unwrap().clone()
    }

    pub(crate) fn tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }

    pub(crate) fn summary_calls(&self) -> usize {
        self.summary_calls.load(Ordering::SeqCst)
    }
}

impl ControllerSource for ScriptedSource {
    async fn fetch_kind(&self, kind: EntityKind) -> Result<Vec<RawSummaryEntry>, ApiError> {
        self.summary_calls.fetch_add(1, Ordering::SeqCst);
        let hold = self.hold.lock().unwrap().clone();
        if let Some(notify) = hold {
            notify.notified().await;
        }
        let mut summaries = self.summaries.lock().unwrap();
        let Some(queue) = summaries.get_mut(&kind) else {
            return Ok(Vec::new());
        };
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().unwrap_or(Ok(Vec::new()))
        }
    }

    async fn fetch_review_page(&self, query: &ReviewQuery) -> Result<Vec<RawReviewEvent>, ApiError> {
        self.review_queries.lock().unwrap().push(query.clone());
        self.reviews
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(Vec::new()))
    }

    async fn send_command(&self, id: &str, request: &ActivityRequest) -> Result<(), ApiError> {
        self.commands
            .lock()
            .unwrap()
            .push((id.to_owned(), request.clone()));
        self.command_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }

    fn replace_token(&self, token: SecretString) {
        self.tokens
            .lock()
            .unwrap()
            .push(token.expose_secret().to_owned());
    }
}

/// A review log that answers queries the way the controller does: events
/// after `reference_time`, oldest first, at most `page_size` per page.
/// With `honor_reference_id`, a known `reference_id` resumes right after
/// that event instead.
pub(crate) struct ReviewLog {
    events: Vec<RawReviewEvent>,
    page_size: usize,
    honor_reference_id: bool,
    queries: Mutex<Vec<ReviewQuery>>,
}

impl ReviewLog {
    pub(crate) fn new(mut events: Vec<RawReviewEvent>, page_size: usize, honor_reference_id: bool) -> Self {
        events.sort_by(|a, b| (a.when_ticks, &a.id).cmp(&(b.when_ticks, &b.id)));
        Self {
            events,
            page_size,
            honor_reference_id,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn queries(&self) -> Vec<ReviewQuery> {
        self.queries.lock().unwrap().clone()
    }
}

impl ControllerSource for ReviewLog {
    async fn fetch_kind(&self, _kind: EntityKind) -> Result<Vec<RawSummaryEntry>, ApiError> {
        Ok(Vec::new())
    }

    async fn fetch_review_page(&self, query: &ReviewQuery) -> Result<Vec<RawReviewEvent>, ApiError> {
        self.queries.lock().unwrap().push(query.clone());
        let resume = query
            .reference_id
            .as_ref()
            .filter(|_| self.honor_reference_id)
            .and_then(|id| self.events.iter().position(|e| &e.id == id));
        let page = match resume {
            Some(pos) => self.events[pos + 1..].iter().take(self.page_size).cloned().collect(),
            None => self
                .events
                .iter()
                .filter(|e| query.reference_time.is_none_or(|t| e.when_ticks > t))
                .take(self.page_size)
                .cloned()
                .collect(),
        };
        Ok(page)
    }

    async fn send_command(&self, _id: &str, _request: &ActivityRequest) -> Result<(), ApiError> {
        Ok(())
    }

    fn replace_token(&self, _token: SecretString) {}
}

// ── Fixtures ─────────────────────────────────────────────────────────

pub(crate) fn summary(id: &str, name: &str, state: u32) -> RawSummaryEntry {
    serde_json::from_value(json!({
        "EntityInfo": { "ID": id, "Name": name },
        "CurrentState": state,
        "LastStateChangeTime": 638_400_000_000_u64,
    }))
    .unwrap()
}

pub(crate) fn raw_event(id: &str, ticks: u64, code: u64) -> RawReviewEvent {
    serde_json::from_value(json!({
        "ID": id,
        "Description": format!("event {id}"),
        "MessageCategory": code,
        "When": "2024-05-01T10:00:00+10:00",
        "WhenTicks": ticks,
    }))
    .unwrap()
}

pub(crate) fn review_event(id: &str, ticks: u64, code: u64) -> ReviewEvent {
    ReviewEvent::from(raw_event(id, ticks, code))
}

pub(crate) fn unauthorized() -> ApiError {
    ApiError::Unauthorized { status: 401 }
}

pub(crate) fn unreachable() -> ApiError {
    ApiError::Transient {
        message: "connection refused".into(),
        status: None,
    }
}
