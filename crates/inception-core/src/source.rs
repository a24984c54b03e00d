// ── Controller access seam ──
//
// The coordinator, tailer and command path only need four operations from
// the controller. Putting them behind a trait lets the engine run against
// the real HTTP client or a scripted source in tests.

use std::future::Future;

use inception_api::{
    ActivityRequest, Error as ApiError, InceptionClient, RawReviewEvent, RawSummaryEntry,
    ReviewQuery,
};
use secrecy::SecretString;

use crate::model::EntityKind;

pub trait ControllerSource: Send + Sync + 'static {
    /// All visible entries of one kind.
    fn fetch_kind(
        &self,
        kind: EntityKind,
    ) -> impl Future<Output = Result<Vec<RawSummaryEntry>, ApiError>> + Send;

    /// One page of review events after `query`, oldest first.
    fn fetch_review_page(
        &self,
        query: &ReviewQuery,
    ) -> impl Future<Output = Result<Vec<RawReviewEvent>, ApiError>> + Send;

    fn send_command(
        &self,
        id: &str,
        request: &ActivityRequest,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn replace_token(&self, token: SecretString);
}

impl ControllerSource for InceptionClient {
    async fn fetch_kind(&self, kind: EntityKind) -> Result<Vec<RawSummaryEntry>, ApiError> {
        self.fetch_summary(kind).await
    }

    async fn fetch_review_page(&self, query: &ReviewQuery) -> Result<Vec<RawReviewEvent>, ApiError> {
        InceptionClient::fetch_review_page(self, query).await
    }

    async fn send_command(&self, id: &str, request: &ActivityRequest) -> Result<(), ApiError> {
        self.send_activity(id, request).await
    }

    fn replace_token(&self, token: SecretString) {
        InceptionClient::replace_token(self, token);
    }
}
