//! Config subcommand handlers.

use dialoguer::{Confirm, Input, Select};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of `cfg` with plaintext tokens masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.token.is_some() {
            profile.token = Some("****".into());
        }
    }
    cfg
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_token() -> Result<String, CliError> {
    let token = rpassword::prompt_password("API token: ").map_err(prompt_err)?;
    let token = token.trim().to_owned();
    if token.is_empty() {
        return Err(CliError::Validation {
            field: "token".into(),
            reason: "API token cannot be empty".into(),
        });
    }
    Ok(token)
}

fn store_in_keyring(profile_name: &str, token: &str) -> Result<(), CliError> {
    inception_config::store_token(profile_name, token).map_err(|e| CliError::Validation {
        field: "keyring".into(),
        reason: format!("failed to store token: {e}"),
    })
}

#[derive(Serialize, Tabled)]
struct ProfileEntry {
    #[tabled(rename = "Profile")]
    name: String,
    #[tabled(rename = "Controller")]
    controller: String,
    #[tabled(rename = "Default", display_with = "default_marker")]
    default: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn default_marker(default: &bool) -> String {
    if *default { "*".into() } else { String::new() }
}

impl ProfileEntry {
    fn copy(&self) -> Self {
        Self {
            name: self.name.clone(),
            controller: self.controller.clone(),
            default: self.default,
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global),

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config(global)?);
            let out = match global.output {
                OutputFormat::Table | OutputFormat::Plain => {
                    toml::to_string_pretty(&cfg).map_err(|e| CliError::Render(e.to_string()))?
                }
                format => output::render_single(format, &cfg, |_| String::new(), |_| {
                    String::new()
                })?,
            };
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config(global)?;
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: inception config init");
                return Ok(());
            }
            let default = config::active_profile_name(global, &cfg);
            let entries: Vec<ProfileEntry> = cfg
                .profile_names()
                .into_iter()
                .map(|name| ProfileEntry {
                    name: name.to_owned(),
                    controller: cfg.profiles[name].controller.clone(),
                    default: name == default,
                })
                .collect();
            let out =
                output::render_list(global.output, &entries, ProfileEntry::copy, |e| {
                    e.name.clone()
                })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config(global)?;
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(global, &cfg)?;
            if !global.quiet {
                eprintln!("✓ Default profile set to '{name}'");
            }
            Ok(())
        }

        // ── SetToken ────────────────────────────────────────────────
        ConfigCommand::SetToken => {
            let cfg = config::load_config(global)?;
            let profile_name = config::active_profile_name(global, &cfg);
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name: profile_name,
                });
            }

            let token = prompt_token()?;
            store_in_keyring(&profile_name, &token)?;
            eprintln!("✓ Token stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}

/// Interactive wizard: adds (or replaces) one profile and makes it the default.
fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let config_path = config::config_path(global);
    eprintln!("Inception CLI configuration");
    eprintln!("   Config path: {}\n", config_path.display());

    let mut cfg = config::load_config_or_default(global);

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let controller: String = Input::new()
        .with_prompt("Controller URL")
        .default("https://inception.local".into())
        .interact_text()
        .map_err(prompt_err)?;

    let insecure = Confirm::new()
        .with_prompt("Accept a self-signed certificate?")
        .default(false)
        .interact()
        .map_err(prompt_err)?;

    eprintln!("\n   Create a REST API token under Configuration > Users on the controller.");
    let token = prompt_token()?;

    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the token?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let plaintext = if selection == 0 {
        store_in_keyring(&profile_name, &token)?;
        eprintln!("   ✓ Token stored in system keyring");
        None
    } else {
        Some(token)
    };

    let profile = Profile {
        controller,
        token: plaintext,
        insecure: insecure.then_some(true),
        ..Profile::default()
    };

    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());
    config::save_config(global, &cfg)?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: inception snapshot");
    Ok(())
}
