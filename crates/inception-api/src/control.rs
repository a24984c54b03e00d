// Resource summary and command endpoints
//
// One summary call per resource kind returns every entity the token can
// see. Entries are parsed one by one so a single bad record only costs
// that record.

use serde_json::Value;
use tracing::{debug, warn};

use crate::client::InceptionClient;
use crate::error::Error;
use crate::models::{ActivityRequest, RawSummaryEntry, ResourceKind};

impl InceptionClient {
    /// Fetch all visible entities of one kind.
    ///
    /// `GET control/{kind}/summary`
    ///
    /// Entries that fail to decode are dropped with a warning. A response
    /// without the `"Doors"`/`"Areas"`/... collection is `Malformed`.
    pub async fn fetch_summary(&self, kind: ResourceKind) -> Result<Vec<RawSummaryEntry>, Error> {
        let path = self.endpoints().summary_path(kind);
        let value = self.get(&path).await?;
        let entries = parse_summary(kind, value)?;
        debug!(%kind, count = entries.len(), "fetched summary");
        Ok(entries)
    }

    /// Issue a control command against one entity.
    ///
    /// `POST control/{kind}/{id}/activity`
    pub async fn send_activity(&self, id: &str, request: &ActivityRequest) -> Result<(), Error> {
        let kind = request.kind();
        let path = self.endpoints().activity_path(kind, id);
        debug!(%kind, id, ?request, "sending activity");
        self.post(&path, request, self.default_timeout()).await?;
        Ok(())
    }
}

fn parse_summary(kind: ResourceKind, value: Value) -> Result<Vec<RawSummaryEntry>, Error> {
    let key = kind.collection_key();
    let Value::Object(mut root) = value else {
        return Err(Error::Malformed {
            message: format!("{kind} summary is not a JSON object"),
            body: value.to_string(),
        });
    };

    let collection = match root.remove(key) {
        Some(Value::Object(map)) => map,
        Some(Value::Null) => return Ok(Vec::new()),
        Some(other) => {
            return Err(Error::Malformed {
                message: format!("{key} is not a JSON object"),
                body: other.to_string(),
            });
        }
        None => {
            return Err(Error::Malformed {
                message: format!("{kind} summary is missing {key}"),
                body: Value::Object(root).to_string(),
            });
        }
    };

    let mut entries = Vec::with_capacity(collection.len());
    for (map_key, raw) in collection {
        match serde_json::from_value::<RawSummaryEntry>(raw) {
            Ok(mut entry) => {
                if entry.entity_info.id.is_empty() {
                    entry.entity_info.id = map_key;
                }
                entries.push(entry);
            }
            Err(e) => warn!(%kind, key = %map_key, error = %e, "dropping malformed summary entry"),
        }
    }
    Ok(entries)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn bad_entries_are_dropped_individually() {
        let body = json!({
            "Inputs": {
                "i-1": {"EntityInfo": {"ID": "i-1", "Name": "PIR Hall", "InputType": 1}, "CurrentState": 64},
                "i-2": {"EntityInfo": {"Name": "no id"}, "CurrentState": 1},
                "i-3": {"EntityInfo": {"ID": "i-3", "Name": "Reed"}, "CurrentState": "sealed"},
            }
        });
        let entries = parse_summary(ResourceKind::Input, body).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entity_info.id, "i-1");
        assert_eq!(entries[0].entity_info.input_type, Some(1));
    }

    #[test]
    fn missing_collection_is_malformed() {
        let err = parse_summary(ResourceKind::Door, json!({"Areas": {}})).unwrap_err();
        assert!(err.is_malformed());

        let err = parse_summary(ResourceKind::Door, json!([1, 2])).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn null_collection_is_empty() {
        let entries = parse_summary(ResourceKind::User, json!({"Users": null})).unwrap();
        assert!(entries.is_empty());
    }
}
