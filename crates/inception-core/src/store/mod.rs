// ── Snapshot store ──
//
// Holds the current entity snapshot and replaces it wholesale on commit.

mod diff;
mod snapshot;
mod snapshot_store;

pub use diff::{EntityChange, diff};
pub use snapshot::Snapshot;
pub use snapshot_store::SnapshotStore;
