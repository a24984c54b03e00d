// ── Core error types ──
//
// Errors surfaced by the engine. Transport failures arrive through the
// exhaustive `From<inception_api::Error>` impl, which keeps the
// retry-relevant classes (auth, unavailable, transient, malformed) distinct.

use thiserror::Error;

use crate::model::EntityKind;

#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Authentication required: {message}")]
    Unauthorized { message: String },

    #[error("Controller unreachable: {message}")]
    Transient { message: String },

    #[error("Controller request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Not available to this identity: {resource}")]
    NotFound { resource: String },

    #[error("Entity not found: {kind} with id {id}")]
    EntityNotFound { kind: EntityKind, id: String },

    #[error("Malformed controller response: {message}")]
    Malformed { message: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Operation not supported: {operation}")]
    Unsupported { operation: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Operation rejected by controller: {message}")]
    Rejected { message: String, status: Option<u16> },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. } | Self::Timeout { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<inception_api::Error> for CoreError {
    fn from(err: inception_api::Error) -> Self {
        match err {
            e @ inception_api::Error::Unauthorized { .. } => CoreError::Unauthorized {
                message: e.to_string(),
            },
            inception_api::Error::NotFound { path } => CoreError::NotFound { resource: path },
            inception_api::Error::Transient { message, .. } => CoreError::Transient { message },
            inception_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            inception_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            inception_api::Error::Tls(message) => CoreError::Config {
                message: format!("TLS setup failed: {message}"),
            },
            inception_api::Error::Malformed { message, body: _ } => {
                CoreError::Malformed { message }
            }
            inception_api::Error::Rejected { status, message } => CoreError::Rejected {
                message,
                status: (status != 0).then_some(status),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_keep_their_class() {
        let auth = CoreError::from(inception_api::Error::Unauthorized { status: 401 });
        assert!(auth.is_auth());

        let slow = CoreError::from(inception_api::Error::Timeout { timeout_secs: 10 });
        assert!(slow.is_transient());

        let gone = CoreError::from(inception_api::Error::NotFound {
            path: "monitor-updates".into(),
        });
        assert!(matches!(gone, CoreError::NotFound { ref resource } if resource == "monitor-updates"));
    }

    #[test]
    fn builder_rejections_drop_the_zero_status() {
        let err = CoreError::from(inception_api::Error::Rejected {
            status: 0,
            message: "bad header".into(),
        });
        assert!(matches!(err, CoreError::Rejected { status: None, .. }));
    }
}
