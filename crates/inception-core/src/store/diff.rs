// ── Snapshot diffing ──
//
// Compares by value, not by `Arc` identity: a record re-fetched with
// identical content is not a change.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::model::{EntityKey, EntityRecord};

/// One entity-level difference between two snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "change", rename_all = "lowercase")]
pub enum EntityChange {
    /// New, or present in both with different content.
    Changed {
        key: EntityKey,
        record: Arc<EntityRecord>,
        #[serde(skip)]
        previous: Option<Arc<EntityRecord>>,
    },
    /// Present before, absent now (deleted or no longer visible).
    Removed {
        key: EntityKey,
        last: Arc<EntityRecord>,
    },
}

impl EntityChange {
    pub fn key(&self) -> &EntityKey {
        match self {
            Self::Changed { key, .. } | Self::Removed { key, .. } => key,
        }
    }

    /// The record as it is now, or as it was last seen if removed.
    pub fn record(&self) -> &Arc<EntityRecord> {
        match self {
            Self::Changed { record, .. } => record,
            Self::Removed { last, .. } => last,
        }
    }

    pub fn is_removal(&self) -> bool {
        matches!(self, Self::Removed { .. })
    }
}

/// Changes needed to go from `previous` to `next`: changed entries in key
/// order, then removals in key order.
pub fn diff(
    previous: &BTreeMap<EntityKey, Arc<EntityRecord>>,
    next: &BTreeMap<EntityKey, Arc<EntityRecord>>,
) -> Vec<EntityChange> {
    let mut changes: Vec<EntityChange> = next
        .iter()
        .filter_map(|(key, record)| match previous.get(key) {
            Some(old) if old.as_ref() == record.as_ref() => None,
            old => Some(EntityChange::Changed {
                key: key.clone(),
                record: Arc::clone(record),
                previous: old.cloned(),
            }),
        })
        .collect();

    changes.extend(
        previous
            .iter()
            .filter(|(key, _)| !next.contains_key(*key))
            .map(|(key, last)| EntityChange::Removed {
                key: key.clone(),
                last: Arc::clone(last),
            }),
    );

    changes
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::model::{Capability, EntityAttributes, EntityKind, PublicState};

    fn door(id: &str, bits: u32) -> Arc<EntityRecord> {
        Arc::new(EntityRecord {
            id: id.into(),
            kind: EntityKind::Door,
            name: format!("Door {id}"),
            reporting_id: None,
            attributes: EntityAttributes::Door {
                state: PublicState::new(EntityKind::Door, bits),
                last_state_change: None,
            },
            permissions: BTreeSet::from([Capability::View]),
            extra: serde_json::Map::new(),
        })
    }

    fn map(records: &[Arc<EntityRecord>]) -> BTreeMap<EntityKey, Arc<EntityRecord>> {
        records.iter().map(|r| (r.key(), Arc::clone(r))).collect()
    }

    #[test]
    fn identical_content_is_not_a_change() {
        let before = map(&[door("d-1", 0x100)]);
        let after = map(&[door("d-1", 0x100)]);
        assert!(diff(&before, &after).is_empty());
    }

    #[test]
    fn state_change_addition_and_removal() {
        let before = map(&[door("d-1", 0x100), door("d-2", 0x100)]);
        let after = map(&[door("d-1", 0x001), door("d-3", 0x200)]);

        let changes = diff(&before, &after);
        let summary: Vec<(String, bool)> = changes
            .iter()
            .map(|c| (c.key().to_string(), c.is_removal()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("door/d-1".to_owned(), false),
                ("door/d-3".to_owned(), false),
                ("door/d-2".to_owned(), true),
            ]
        );

        let EntityChange::Changed { previous, .. } = &changes[0] else {
            panic!("expected a change");
        };
        assert_eq!(previous.as_ref().and_then(|p| p.state()).map(|s| s.bits), Some(0x100));
    }
}
