//! State sync and review event streaming for Inner Range Inception
//! controllers.
//!
//! - **[`Engine`]** is the facade. It owns one shared
//!   [`InceptionClient`](inception_api::InceptionClient) and runs two
//!   independent polling tasks on top of it.
//!
//! - The **coordinator** fetches every resource kind on a timer and commits
//!   the result as an immutable [`Snapshot`], all or nothing. Changes
//!   against the previous snapshot go to the router.
//!
//! - The **tailer** follows the controller's review log from a tick
//!   [`Cursor`], de-duplicates across cursor boundaries and delivers events
//!   in `(when_ticks, event_id)` order.
//!
//! - The **[`Router`]** fans entity changes, events and re-authentication
//!   signals out to [`Listener`]s, gated by per-category switches.
//!
//! Both tasks halt on `Unauthorized` until
//! [`Engine::update_credentials`] is called.

mod auth;
pub mod backoff;
pub mod command;
pub mod config;
pub mod convert;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod model;
pub mod router;
pub mod source;
pub mod store;
pub mod stream;
pub mod tailer;

#[cfg(test)]
pub(crate) mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use inception_api::{AuthHeader, Endpoints};
pub use command::ControlAction;
pub use config::{
    CursorStart, EngineConfig, GapPolicy, RefreshConfig, SyncConfig, TailerConfig,
    TlsVerification,
};
pub use coordinator::{CoordinatorPhase, RoundOutcome};
pub use engine::Engine;
pub use error::CoreError;
pub use router::{
    CategorySwitches, ChannelListener, Delivery, Listener, ListenerError, ListenerId,
    Notification, Router, TaskOrigin,
};
pub use source::ControllerSource;
pub use store::{EntityChange, Snapshot, SnapshotStore};
pub use stream::SnapshotStream;
pub use tailer::{TailOutcome, TailerStatus};

pub use model::{
    ArmInfo, Capability, Cursor, EntityAttributes, EntityKey, EntityKind, EntityRecord,
    EventCategory, InputType, MessageInfo, PublicState, ReviewEvent, StateFlag,
};
