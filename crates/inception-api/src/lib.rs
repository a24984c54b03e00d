// inception-api: Async Rust client for the Inner Range Inception controller REST API

pub mod client;
mod control;
mod de;
pub mod endpoints;
pub mod error;
pub mod models;
mod review;
pub mod transport;

pub use client::{DEFAULT_REVIEW_TIMEOUT, InceptionClient};
pub use endpoints::{AuthHeader, Endpoints};
pub use error::Error;
pub use models::{
    ActivityRequest, AreaControl, DoorControl, InputControl, OutputControl, RawArmInfo,
    RawEntityInfo, RawReviewEvent, RawSummaryEntry, ResourceKind, ReviewQuery,
};
pub use transport::{TlsMode, TransportConfig};
