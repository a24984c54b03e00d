//! Shared configuration for Inception tools.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation to `inception_core::EngineConfig`. The CLI layers its flag
//! overrides on top.

mod duration;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use inception_core::{
    AuthHeader, CursorStart, EngineConfig, Endpoints, EntityKind, EventCategory, GapPolicy,
    RefreshConfig, SyncConfig, TailerConfig, TlsVerification,
};

/// Keyring service name; entries are `{profile}/token`.
pub const KEYRING_SERVICE: &str = "inception";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API token configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl From<keyring::Error> for ConfigError {
    fn from(err: keyring::Error) -> Self {
        Self::Keyring(err.to_string())
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named controller profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// `requested`, else the configured default, else `"default"`.
    pub fn active_profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }

    /// Profile names, sorted.
    pub fn profile_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Defaults {
    pub output: String,
    pub color: String,
    pub insecure: bool,
    #[serde(with = "duration")]
    pub timeout: Duration,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: "table".into(),
            color: "auto".into(),
            insecure: false,
            timeout: Duration::from_secs(10),
        }
    }
}

/// A named controller profile.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Controller base URL (e.g., "https://inception.local").
    pub controller: String,

    /// API token (plaintext; prefer keyring or env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Environment variable holding the API token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    /// Path to a custom CA certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Override the insecure TLS default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Override the request timeout.
    #[serde(
        default,
        with = "duration::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout: Option<Duration>,

    /// Credential header name (default `Authorization`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_header: Option<String>,

    /// Token prefix (default `APIToken`); empty sends the raw token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_scheme: Option<String>,

    #[serde(default, skip_serializing_if = "EndpointSettings::is_empty")]
    pub endpoints: EndpointSettings,

    #[serde(default)]
    pub sync: SyncSettings,
}

/// Path overrides for controller firmware that differs from the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct EndpointSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
}

impl EndpointSettings {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn to_endpoints(&self) -> Endpoints {
        let defaults = Endpoints::default();
        Endpoints {
            api_prefix: self.api_prefix.clone().unwrap_or(defaults.api_prefix),
            summary_template: self.summary.clone().unwrap_or(defaults.summary_template),
            activity_template: self.activity.clone().unwrap_or(defaults.activity_template),
            review_path: self.review.clone().unwrap_or(defaults.review_path),
        }
    }
}

/// Polling settings for one profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SyncSettings {
    #[serde(with = "duration")]
    pub refresh_interval: Duration,
    #[serde(with = "duration")]
    pub event_interval: Duration,
    #[serde(with = "duration")]
    pub review_timeout: Duration,
    #[serde(with = "duration")]
    pub max_backoff: Duration,
    pub page_size: usize,
    pub max_pages: usize,
    pub dedup_window: usize,
    pub gap_policy: GapPolicy,
    pub cursor_start: CursorStart,
    pub events_enabled: bool,
    pub disabled_categories: Vec<EventCategory>,
    pub kinds: Vec<EntityKind>,
}

impl Default for SyncSettings {
    fn default() -> Self {
        let sync = SyncConfig::default();
        Self {
            refresh_interval: sync.refresh.interval,
            event_interval: sync.tailer.interval,
            review_timeout: Duration::from_secs(70),
            max_backoff: sync.refresh.max_backoff,
            page_size: sync.tailer.page_size,
            max_pages: sync.tailer.max_pages,
            dedup_window: sync.tailer.dedup_window,
            gap_policy: sync.tailer.gap_policy,
            cursor_start: sync.tailer.cursor_start,
            events_enabled: sync.events_enabled,
            disabled_categories: sync.disabled_categories,
            kinds: sync.refresh.kinds,
        }
    }
}

impl SyncSettings {
    pub fn to_sync_config(&self) -> Result<SyncConfig, ConfigError> {
        for (field, value) in [
            ("sync.page_size", self.page_size),
            ("sync.max_pages", self.max_pages),
            ("sync.dedup_window", self.dedup_window),
        ] {
            if value == 0 {
                return Err(ConfigError::Validation {
                    field: field.into(),
                    reason: "must be at least 1".into(),
                });
            }
        }
        if self.refresh_interval.is_zero() || self.event_interval.is_zero() {
            return Err(ConfigError::Validation {
                field: "sync".into(),
                reason: "poll intervals must be non-zero".into(),
            });
        }

        Ok(SyncConfig {
            refresh: RefreshConfig {
                interval: self.refresh_interval,
                max_backoff: self.max_backoff,
                kinds: self.kinds.clone(),
            },
            tailer: TailerConfig {
                enabled: true,
                interval: self.event_interval,
                max_backoff: self.max_backoff,
                page_size: self.page_size,
                max_pages: self.max_pages,
                dedup_window: self.dedup_window,
                gap_policy: self.gap_policy,
                cursor_start: self.cursor_start,
            },
            events_enabled: self.events_enabled,
            disabled_categories: self.disabled_categories.clone(),
        })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "inception", "inception").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("inception");
    p
}

// ── Loading and saving ──────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Defaults, then `path` (if it exists), then `INCEPTION_*` variables with
/// `__` separating nested keys.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("INCEPTION_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file is missing or broken.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

/// Serialize config to TOML and write it to `path`, creating parents.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/token"))
}

/// Store `token` in the system keyring for `profile_name`.
pub fn store_token(profile_name: &str, token: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(token)?;
    Ok(())
}

fn keyring_token(profile_name: &str) -> Option<String> {
    keyring_entry(profile_name).ok()?.get_password().ok()
}

/// Resolve the API token: `token_env` variable, then keyring, then the
/// profile's plaintext `token`.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_token_with(
        profile,
        profile_name,
        |name| std::env::var(name).ok(),
        keyring_token,
    )
}

fn resolve_token_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's token_env → env var lookup
    if let Some(token) = profile.token_env.as_deref().and_then(&env) {
        return Ok(SecretString::from(token));
    }

    // 2. System keyring
    if let Some(token) = keyring(profile_name) {
        return Ok(SecretString::from(token));
    }

    // 3. Plaintext in config
    if let Some(ref token) = profile.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

// ── Translation to EngineConfig ─────────────────────────────────────

/// Build an `EngineConfig` from a profile and an already resolved token.
pub fn engine_config(
    profile: &Profile,
    token: SecretString,
    defaults: &Defaults,
) -> Result<EngineConfig, ConfigError> {
    let url: url::Url = profile
        .controller
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "controller".into(),
            reason: format!("invalid URL: {}", profile.controller),
        })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "controller".into(),
            reason: format!("expected an http(s) URL, got {url}"),
        });
    }

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let default_auth = AuthHeader::default();
    let auth_header = AuthHeader {
        header: profile.auth_header.clone().unwrap_or(default_auth.header),
        scheme: match &profile.auth_scheme {
            Some(scheme) if scheme.is_empty() => None,
            Some(scheme) => Some(scheme.clone()),
            None => default_auth.scheme,
        },
    };

    let mut config = EngineConfig::new(url, token);
    config.auth_header = auth_header;
    config.endpoints = profile.endpoints.to_endpoints();
    config.tls = tls;
    config.timeout = profile.timeout.unwrap_or(defaults.timeout);
    config.review_timeout = profile.sync.review_timeout;
    config.sync = profile.sync.to_sync_config()?;
    Ok(config)
}

/// Build an `EngineConfig` for a profile, resolving its token.
pub fn profile_to_engine_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<EngineConfig, ConfigError> {
    let token = resolve_token(profile, profile_name)?;
    engine_config(profile, token, defaults)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    const SAMPLE: &str = r#"
default_profile = "site"

[defaults]
output = "json"
timeout = "15s"

[profiles.site]
controller = "https://inception.local"
token = "plain-token"
timeout = 20

[profiles.site.sync]
refresh_interval = "1m"
event_interval = "500ms"
gap_policy = "partial"
cursor_start = "ticks:638500"
disabled_categories = ["hardware", "system"]
kinds = ["door", "area"]

[profiles.lab]
controller = "http://10.0.0.5"
insecure = true
auth_scheme = ""

[profiles.lab.endpoints]
api_prefix = "api/v2"
"#;

    fn load(contents: &str) -> Config {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        load_config_from(&path).unwrap()
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.default_profile.as_deref(), Some("default"));
        assert_eq!(config.defaults.timeout, Duration::from_secs(10));
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn parses_profiles_and_human_durations() {
        let config = load(SAMPLE);
        assert_eq!(config.active_profile_name(None), "site");
        assert_eq!(config.active_profile_name(Some("lab")), "lab");
        assert_eq!(config.profile_names(), vec!["lab", "site"]);
        assert_eq!(config.defaults.output, "json");
        assert_eq!(config.defaults.timeout, Duration::from_secs(15));

        let site = config.profile("site").unwrap();
        assert_eq!(site.timeout, Some(Duration::from_secs(20)));
        assert_eq!(site.sync.refresh_interval, Duration::from_secs(60));
        assert_eq!(site.sync.event_interval, Duration::from_millis(500));
        assert_eq!(site.sync.cursor_start, CursorStart::Ticks(638_500));
        assert_eq!(site.sync.page_size, 50);
        assert!(matches!(
            config.profile("nope"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn bad_duration_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[defaults]\ntimeout = \"soon\"\n").unwrap();
        assert!(matches!(
            load_config_from(&path),
            Err(ConfigError::Figment(_))
        ));
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let config = load(SAMPLE);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        save_config_to(&config, &path).unwrap();

        let reloaded = load_config_from(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn engine_config_applies_profile_settings() {
        let config = load(SAMPLE);
        let site = config.profile("site").unwrap();
        let token = SecretString::from("t".to_owned());
        let engine = engine_config(site, token, &config.defaults).unwrap();

        assert_eq!(engine.url.as_str(), "https://inception.local/");
        assert_eq!(engine.tls, TlsVerification::SystemDefaults);
        assert_eq!(engine.timeout, Duration::from_secs(20));
        assert_eq!(engine.review_timeout, Duration::from_secs(70));
        assert_eq!(engine.sync.refresh.interval, Duration::from_secs(60));
        assert_eq!(
            engine.sync.refresh.kinds,
            vec![EntityKind::Door, EntityKind::Area]
        );
        assert_eq!(engine.sync.tailer.gap_policy, GapPolicy::Partial);
        assert_eq!(
            engine.sync.disabled_categories,
            vec![EventCategory::Hardware, EventCategory::System]
        );
        assert_eq!(engine.auth_header, AuthHeader::default());
    }

    #[test]
    fn engine_config_lab_profile_overrides() {
        let config = load(SAMPLE);
        let lab = config.profile("lab").unwrap();
        let token = SecretString::from("t".to_owned());
        let engine = engine_config(lab, token, &config.defaults).unwrap();

        assert_eq!(engine.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(engine.timeout, Duration::from_secs(15));
        assert_eq!(engine.auth_header.scheme, None);
        assert_eq!(engine.endpoints.api_prefix, "api/v2");
        assert_eq!(engine.endpoints.review_path, "monitor-updates");
    }

    #[test]
    fn engine_config_rejects_bad_urls_and_zero_sizes() {
        let defaults = Defaults::default();
        let mut profile = Profile {
            controller: "ftp://controller".into(),
            ..Profile::default()
        };
        let token = || SecretString::from("t".to_owned());
        assert!(matches!(
            engine_config(&profile, token(), &defaults),
            Err(ConfigError::Validation { .. })
        ));

        profile.controller = "https://controller".into();
        profile.sync.page_size = 0;
        assert!(matches!(
            engine_config(&profile, token(), &defaults),
            Err(ConfigError::Validation { ref field, .. }) if field == "sync.page_size"
        ));
    }

    #[test]
    fn token_chain_prefers_env_then_keyring_then_plaintext() {
        let mut profile = Profile {
            controller: "https://controller".into(),
            token: Some("plain".into()),
            token_env: Some("SITE_TOKEN".into()),
            ..Profile::default()
        };
        let env = |name: &str| (name == "SITE_TOKEN").then(|| "from-env".to_owned());
        let keyring = |name: &str| (name == "site").then(|| "from-keyring".to_owned());
        let none = |_: &str| None;

        let token = resolve_token_with(&profile, "site", env, keyring).unwrap();
        assert_eq!(token.expose_secret(), "from-env");

        let token = resolve_token_with(&profile, "site", none, keyring).unwrap();
        assert_eq!(token.expose_secret(), "from-keyring");

        let token = resolve_token_with(&profile, "other", none, keyring).unwrap();
        assert_eq!(token.expose_secret(), "plain");

        profile.token = None;
        assert!(matches!(
            resolve_token_with(&profile, "other", none, none),
            Err(ConfigError::NoCredentials { .. })
        ));
    }
}
