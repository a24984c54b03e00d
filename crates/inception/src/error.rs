//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use inception_config::ConfigError;
use inception_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the controller")]
    #[diagnostic(
        code(inception::unreachable),
        help(
            "Check that the controller is running and reachable.\n\
             {message}\n\
             Self-signed certificate? Try --insecure (-k) or set ca_cert in your profile."
        )
    )]
    Unreachable { message: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(inception::timeout),
        help("Increase the timeout with --timeout or check controller responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────

    #[error("The controller rejected the API token")]
    #[diagnostic(
        code(inception::auth_failed),
        help(
            "Check the token under Configuration > Users > REST API on the controller.\n\
             Run: inception config set-token --profile {profile}"
        )
    )]
    AuthFailed { profile: String },

    #[error("No API token configured for profile '{profile}'")]
    #[diagnostic(
        code(inception::no_credentials),
        help(
            "Configure credentials with: inception config init\n\
             Or set the INCEPTION_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{kind} '{identifier}' not found")]
    #[diagnostic(
        code(inception::not_found),
        help("Run: inception snapshot --kind {kind} to see available entities")
    )]
    NotFound { kind: String, identifier: String },

    #[error("'{resource}' is not available to this API token")]
    #[diagnostic(
        code(inception::unavailable),
        help("The token's user needs permission to view this resource.")
    )]
    Unavailable { resource: String },

    #[error("Operation '{operation}' is not supported")]
    #[diagnostic(code(inception::unsupported))]
    Unsupported { operation: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("The controller rejected the request: {message}")]
    #[diagnostic(code(inception::rejected))]
    Rejected { message: String },

    #[error("Unexpected controller response: {message}")]
    #[diagnostic(code(inception::malformed))]
    Malformed { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(inception::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(inception::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: inception config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No controller configured")]
    #[diagnostic(
        code(inception::no_config),
        help(
            "Create a profile with: inception config init\n\
             Or pass --controller and --token.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("{message}")]
    #[diagnostic(code(inception::config))]
    Config { message: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(inception::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Unreachable { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Unavailable { .. } | Self::Unsupported { .. } => exit_code::PERMISSION,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Name the profile in authentication help text.
    pub fn for_profile(self, name: &str) -> Self {
        match self {
            Self::AuthFailed { .. } => Self::AuthFailed {
                profile: name.into(),
            },
            other => other,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unauthorized { .. } => CliError::AuthFailed {
                profile: "<name>".into(),
            },
            CoreError::Transient { message } => CliError::Unreachable { message },
            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },
            CoreError::NotFound { resource } => CliError::Unavailable { resource },
            CoreError::EntityNotFound { kind, id } => CliError::NotFound {
                kind: kind.to_string(),
                identifier: id,
            },
            CoreError::Malformed { message } => CliError::Malformed { message },
            CoreError::Unsupported { operation } => CliError::Unsupported { operation },
            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "command".into(),
                reason: message,
            },
            CoreError::Rejected { message, status } => CliError::Rejected {
                message: match status {
                    Some(status) => format!("HTTP {status}: {message}"),
                    None => message,
                },
            },
            CoreError::Config { message } => CliError::Config { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: "(see: inception config profiles)".into(),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use inception_core::EntityKind;

    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let cases = [
            (
                CoreError::Unauthorized {
                    message: "401".into(),
                },
                exit_code::AUTH,
            ),
            (
                CoreError::Transient {
                    message: "connection refused".into(),
                },
                exit_code::CONNECTION,
            ),
            (CoreError::Timeout { timeout_secs: 10 }, exit_code::TIMEOUT),
            (
                CoreError::EntityNotFound {
                    kind: EntityKind::Door,
                    id: "d-9".into(),
                },
                exit_code::NOT_FOUND,
            ),
            (
                CoreError::NotFound {
                    resource: "monitor-updates".into(),
                },
                exit_code::PERMISSION,
            ),
            (
                CoreError::ValidationFailed {
                    message: "bad".into(),
                },
                exit_code::USAGE,
            ),
            (
                CoreError::Rejected {
                    message: "busy".into(),
                    status: Some(409),
                },
                exit_code::GENERAL,
            ),
        ];
        for (core, code) in cases {
            assert_eq!(CliError::from(core).exit_code(), code);
        }
    }

    #[test]
    fn config_errors_keep_their_meaning() {
        let err = CliError::from(ConfigError::NoCredentials {
            profile: "site".into(),
        });
        assert!(matches!(err, CliError::NoCredentials { ref profile } if profile == "site"));
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }
}
