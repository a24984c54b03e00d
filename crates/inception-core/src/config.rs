// ── Runtime engine configuration ──
//
// These types describe how to reach one controller and how often to poll
// it. They carry credentials and tuning but never touch disk; the CLI (via
// `inception-config`) builds an `EngineConfig` and hands it in.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use inception_api::{AuthHeader, Endpoints};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use url::Url;

use crate::model::{Cursor, EntityKind, EventCategory};

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store.
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed controller certificates).
    DangerAcceptInvalid,
}

/// Connection and polling settings for one controller.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Controller root, e.g. `https://inception.local`.
    pub url: Url,
    pub token: SecretString,
    pub auth_header: AuthHeader,
    pub endpoints: Endpoints,
    pub tls: TlsVerification,
    /// Timeout for summary and command requests.
    pub timeout: Duration,
    /// Timeout for the review long-poll.
    pub review_timeout: Duration,
    pub sync: SyncConfig,
}

impl EngineConfig {
    pub fn new(url: Url, token: SecretString) -> Self {
        Self {
            url,
            token,
            auth_header: AuthHeader::default(),
            endpoints: Endpoints::default(),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(10),
            review_timeout: inception_api::DEFAULT_REVIEW_TIMEOUT,
            sync: SyncConfig::default(),
        }
    }
}

/// Polling behaviour, independent of how the controller is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub refresh: RefreshConfig,
    pub tailer: TailerConfig,
    /// Initial state of the global review events switch.
    pub events_enabled: bool,
    /// Categories switched off at start.
    pub disabled_categories: Vec<EventCategory>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            refresh: RefreshConfig::default(),
            tailer: TailerConfig::default(),
            events_enabled: true,
            disabled_categories: Vec::new(),
        }
    }
}

/// State coordinator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshConfig {
    pub interval: Duration,
    /// Upper bound for the retry delay after failed rounds.
    pub max_backoff: Duration,
    /// Resource kinds fetched on every round.
    pub kinds: Vec<EntityKind>,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            max_backoff: Duration::from_secs(300),
            kinds: EntityKind::ALL.to_vec(),
        }
    }
}

/// Event cursor tailer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailerConfig {
    pub enabled: bool,
    pub interval: Duration,
    pub max_backoff: Duration,
    /// A page this long is taken to mean more events are waiting.
    pub page_size: usize,
    /// Pages fetched per round before the rest is left for the next one.
    pub max_pages: usize,
    /// Recently delivered event ids remembered for de-duplication.
    pub dedup_window: usize,
    pub gap_policy: GapPolicy,
    pub cursor_start: CursorStart,
}

impl Default for TailerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(2),
            max_backoff: Duration::from_secs(300),
            page_size: 50,
            max_pages: 10,
            dedup_window: 512,
            gap_policy: GapPolicy::default(),
            cursor_start: CursorStart::default(),
        }
    }
}

/// What to do when a round cannot see every event after the cursor.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GapPolicy {
    /// Query one tick behind the cursor and drop a batch whose pagination
    /// failed part-way, so nothing is skipped at the cost of re-fetching.
    #[default]
    Refetch,
    /// Query from the cursor and keep the pages obtained before a failure.
    Partial,
}

/// Where the tailer starts reading on first run or after a reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CursorStart {
    /// Skip history: the first round only positions the cursor.
    #[default]
    Now,
    /// Deliver whatever the controller returns for an empty cursor.
    Backfill,
    /// Resume after an explicit tick count.
    Ticks(u64),
}

impl CursorStart {
    pub fn initial_cursor(self) -> Option<Cursor> {
        match self {
            Self::Ticks(ticks) => Some(Cursor(ticks)),
            Self::Now | Self::Backfill => None,
        }
    }
}

impl fmt::Display for CursorStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Now => f.write_str("now"),
            Self::Backfill => f.write_str("backfill"),
            Self::Ticks(ticks) => write!(f, "ticks:{ticks}"),
        }
    }
}

impl FromStr for CursorStart {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "now" => Ok(Self::Now),
            "backfill" => Ok(Self::Backfill),
            other => other
                .strip_prefix("ticks:")
                .and_then(|ticks| ticks.trim().parse().ok())
                .map(Self::Ticks)
                .ok_or_else(|| {
                    format!("invalid cursor start {s:?} (expected now, backfill or ticks:N)")
                }),
        }
    }
}

impl Serialize for CursorStart {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CursorStart {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
