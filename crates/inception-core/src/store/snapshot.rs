// ── Point-in-time entity snapshot ──

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::model::{EntityKey, EntityKind, EntityRecord};

/// Immutable view of every visible entity after one committed round.
///
/// Readers always hold a complete snapshot; the store swaps the whole
/// `Arc` on commit and never mutates one in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    entities: BTreeMap<EntityKey, Arc<EntityRecord>>,
    generation: u64,
    refreshed_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub(crate) fn new(
        entities: BTreeMap<EntityKey, Arc<EntityRecord>>,
        generation: u64,
        refreshed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            entities,
            generation,
            refreshed_at: Some(refreshed_at),
        }
    }

    /// Number of successful refresh rounds behind this snapshot; 0 before the first.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    pub fn get(&self, kind: EntityKind, id: &str) -> Option<&Arc<EntityRecord>> {
        self.entities.get(&EntityKey::new(kind, id))
    }

    pub fn contains(&self, kind: EntityKind, id: &str) -> bool {
        self.get(kind, id).is_some()
    }

    /// Records of one kind, ordered by id.
    pub fn of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &Arc<EntityRecord>> {
        self.entities
            .iter()
            .filter(move |(key, _)| key.kind == kind)
            .map(|(_, record)| record)
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.of_kind(kind).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityKey, &Arc<EntityRecord>)> {
        self.entities.iter()
    }

    pub fn records(&self) -> impl Iterator<Item = &Arc<EntityRecord>> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub(crate) fn entities(&self) -> &BTreeMap<EntityKey, Arc<EntityRecord>> {
        &self.entities
    }
}
