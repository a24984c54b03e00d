// Review log (audit events) via the update monitor
//
// The controller exposes its review log through a long-poll: the request
// returns as soon as there are events after the reference point, or empty
// once its own hold time elapses.

use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::client::InceptionClient;
use crate::error::Error;
use crate::models::{RawReviewEvent, ReviewQuery};

const MONITOR_ID: &str = "LiveReviewEvents";

impl InceptionClient {
    /// Fetch one page of review events after `query`.
    ///
    /// `POST monitor-updates` with a single `LiveReviewEvents` request.
    /// Events come back oldest first; records that fail to decode are
    /// dropped with a warning.
    pub async fn fetch_review_page(&self, query: &ReviewQuery) -> Result<Vec<RawReviewEvent>, Error> {
        let path = self.endpoints().review_path.clone();
        let body = review_request(query);
        let value = self.post(&path, &body, self.review_timeout()).await?;
        let events = parse_review_page(value)?;
        debug!(
            reference_time = ?query.reference_time,
            count = events.len(),
            "fetched review page"
        );
        Ok(events)
    }
}

fn review_request(query: &ReviewQuery) -> Value {
    let reference_time = query
        .reference_time
        .map_or_else(|| json!("null"), |ticks| json!(ticks));
    let reference_id = query
        .reference_id
        .as_deref()
        .map_or_else(|| json!("null"), |id| json!(id));

    json!([{
        "ID": MONITOR_ID,
        "RequestType": MONITOR_ID,
        "InputData": {
            "referenceId": reference_id,
            "referenceTime": reference_time,
        },
    }])
}

fn parse_review_page(value: Value) -> Result<Vec<RawReviewEvent>, Error> {
    let result = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Object(mut root) => root.remove("Result"),
        // Some firmware answers with one result object per monitor request.
        Value::Array(items) => items.into_iter().find_map(|item| match item {
            Value::Object(mut obj) if obj.get("ID").and_then(Value::as_str) == Some(MONITOR_ID) => {
                obj.remove("Result")
            }
            _ => None,
        }),
        other => {
            return Err(Error::Malformed {
                message: "review response is not a JSON object".into(),
                body: other.to_string(),
            });
        }
    };

    let records = match result {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(records)) => records,
        Some(other) => {
            return Err(Error::Malformed {
                message: "review Result is not an array".into(),
                body: other.to_string(),
            });
        }
    };

    let mut events = Vec::with_capacity(records.len());
    for raw in records {
        match serde_json::from_value::<RawReviewEvent>(raw) {
            Ok(event) => events.push(event),
            Err(e) => warn!(error = %e, "dropping malformed review event"),
        }
    }
    Ok(events)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn request_uses_null_strings_without_a_cursor() {
        let body = review_request(&ReviewQuery::default());
        assert_eq!(
            body,
            json!([{
                "ID": "LiveReviewEvents",
                "RequestType": "LiveReviewEvents",
                "InputData": {"referenceId": "null", "referenceTime": "null"}
            }])
        );
    }

    #[test]
    fn request_carries_cursor_ticks() {
        let body = review_request(&ReviewQuery {
            reference_time: Some(638_500),
            reference_id: Some("e-9".into()),
        });
        assert_eq!(body[0]["InputData"]["referenceTime"], json!(638_500));
        assert_eq!(body[0]["InputData"]["referenceId"], json!("e-9"));
    }

    #[test]
    fn missing_result_is_an_empty_page() {
        assert!(parse_review_page(json!({"ID": "LiveReviewEvents"})).unwrap().is_empty());
        assert!(parse_review_page(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn array_responses_pick_the_review_monitor() {
        let page = parse_review_page(json!([
            {"ID": "EntityStates", "Result": {"stateData": []}},
            {"ID": "LiveReviewEvents", "Result": [
                {"ID": "e-1", "WhenTicks": 100, "MessageCategory": 5000},
                {"ID": "e-2"},
                {"ID": "e-3", "WhenTicks": "105"}
            ]}
        ]))
        .unwrap();
        let ids: Vec<_> = page.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e-1", "e-3"]);
    }

    #[test]
    fn non_array_result_is_malformed() {
        let err = parse_review_page(json!({"Result": "nope"})).unwrap_err();
        assert!(err.is_malformed());
    }
}
