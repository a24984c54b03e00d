use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Top-level error type for the `inception-api` crate.
///
/// Every failure is folded into one of a handful of classes that callers
/// can act on without looking at HTTP details: credentials rejected,
/// resource unavailable, transient (retry later), malformed payload, or a
/// request the controller refused outright. `inception-core` decides the
/// retry policy; this crate never retries on its own.
///
/// The type is `Clone` so a single failure can be reported to several
/// consumers (for example both polling tasks).
#[derive(Debug, Clone, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The controller rejected the token (HTTP 401 or 403).
    #[error("Controller rejected the API token (HTTP {status})")]
    Unauthorized { status: u16 },

    // ── Availability ────────────────────────────────────────────────
    /// The resource does not exist or is hidden from this identity (HTTP 404).
    #[error("Resource not available: {path}")]
    NotFound { path: String },

    // ── Transport ───────────────────────────────────────────────────
    /// Connection failure, reset, throttling or a server-side error.
    #[error("Transient controller failure: {message}")]
    Transient {
        message: String,
        status: Option<u16>,
    },

    /// The request did not complete within the configured timeout.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// URL construction failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate loading failed.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// The response body could not be decoded, with the raw body for debugging.
    #[error("Malformed response: {message}")]
    Malformed { message: String, body: String },

    /// Any other 4xx: the controller understood and refused the request.
    #[error("Controller rejected the request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },
}

impl Error {
    /// Returns `true` if the credentials need to be replaced before
    /// any further call can succeed.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. } | Self::Timeout { .. })
    }

    /// Returns `true` if the resource is unavailable to this identity.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if the payload could not be decoded.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status } | Self::Rejected { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(404),
            Self::Transient { status, .. } => *status,
            _ => None,
        }
    }

    /// Translate a non-success HTTP status into the error taxonomy.
    pub(crate) fn from_status(status: StatusCode, path: &str, body: &str) -> Self {
        match status.as_u16() {
            401 | 403 => Self::Unauthorized {
                status: status.as_u16(),
            },
            404 => Self::NotFound { path: path.into() },
            code if code == 408 || code == 429 || status.is_server_error() => Self::Transient {
                message: format!("HTTP {status} from {path}"),
                status: Some(code),
            },
            code => Self::Rejected {
                status: code,
                message: summarize_body(body),
            },
        }
    }

    /// Translate a `reqwest` failure that happened before a status was seen.
    pub(crate) fn from_reqwest(err: &reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            return Self::Timeout {
                timeout_secs: timeout.as_secs(),
            };
        }
        if err.is_builder() {
            return Self::Rejected {
                status: 0,
                message: err.to_string(),
            };
        }
        Self::Transient {
            message: err.to_string(),
            status: err.status().map(|s| s.as_u16()),
        }
    }
}

/// Keep error messages readable when the controller answers with a page of HTML.
fn summarize_body(body: &str) -> String {
    const LIMIT: usize = 200;
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".into();
    }
    match trimmed.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}…", &trimmed[..idx]),
        None => trimmed.to_owned(),
    }
}
