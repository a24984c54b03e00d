// ── Domain model ──
//
// Canonical types for everything the engine mirrors or forwards.

pub mod entity;
pub mod event;
pub mod messages;
pub mod state;

pub use entity::{ArmInfo, Capability, EntityAttributes, EntityKey, EntityKind, EntityRecord};
pub use event::{Cursor, EventCategory, ReviewEvent};
pub use messages::MessageInfo;
pub use state::{InputType, PublicState, StateFlag};
