//! CLI configuration: thin wrapper around `inception_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides (--controller,
//! --token, --insecure, --timeout, --config).

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use inception_core::EngineConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use inception_config::{Config, Profile};

// ── CLI-specific helpers ────────────────────────────────────────────

/// The config file in use: `--config`, else the platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(inception_config::config_path)
}

pub fn load_config(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(inception_config::load_config_from(&config_path(global))?)
}

/// Like [`load_config`], falling back to defaults when the file is unreadable.
pub fn load_config_or_default(global: &GlobalOpts) -> Config {
    load_config(global).unwrap_or_default()
}

pub fn save_config(global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    inception_config::save_config_to(cfg, &config_path(global))?;
    Ok(())
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Build an `EngineConfig` from the config file, the active profile, and
/// CLI overrides. Flags win over profile values.
pub fn resolve_engine_config(global: &GlobalOpts) -> Result<EngineConfig, CliError> {
    let cfg = load_config(global)?;
    let profile_name = active_profile_name(global, &cfg);

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        // An explicitly requested profile must exist.
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                available: available_profiles(&cfg),
                name: profile_name,
            });
        }
        None if global.controller.is_some() => Profile::default(),
        None => {
            return Err(CliError::NoConfig {
                path: config_path(global).display().to_string(),
            });
        }
    };

    if let Some(ref controller) = global.controller {
        profile.controller.clone_from(controller);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(secs) = global.timeout {
        profile.timeout = Some(Duration::from_secs(secs));
    }

    let token = match global.token {
        Some(ref token) => SecretString::from(token.clone()),
        None => inception_config::resolve_token(&profile, &profile_name)?,
    };

    tracing::debug!(profile = %profile_name, controller = %profile.controller, "resolved profile");
    Ok(inception_config::engine_config(&profile, token, &cfg.defaults)?)
}

/// Comma-separated profile names, or `(none)`.
pub fn available_profiles(cfg: &Config) -> String {
    let names = cfg.profile_names();
    if names.is_empty() {
        "(none)".into()
    } else {
        names.join(", ")
    }
}
