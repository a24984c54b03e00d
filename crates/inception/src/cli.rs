//! Clap derive structures for the `inception` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use inception_core::{EntityKind, EventCategory};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// inception -- mirror and control Inner Range Inception controllers
#[derive(Debug, Parser)]
#[command(
    name = "inception",
    version,
    about = "Mirror and control Inner Range Inception controllers",
    long_about = "Polls an Inception controller's REST API for doors, areas, inputs,\n\
        outputs and users, tails its review log, and issues control commands.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Controller profile to use
    #[arg(long, short = 'p', env = "INCEPTION_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Controller URL (overrides profile)
    #[arg(long, short = 'c', env = "INCEPTION_CONTROLLER", global = true)]
    pub controller: Option<String>,

    /// API token (overrides keyring and profile)
    #[arg(long, env = "INCEPTION_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "INCEPTION_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "INCEPTION_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "INCEPTION_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "INCEPTION_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch every resource kind once and print the entities
    #[command(alias = "snap", alias = "ls")]
    Snapshot(SnapshotArgs),

    /// Keep the mirror running and print entity changes and events
    Watch(WatchArgs),

    /// Read the controller's review log
    #[command(alias = "ev")]
    Events(EventsArgs),

    /// Send a control command to a door, area, input or output
    #[command(alias = "ctl")]
    Control(ControlArgs),

    /// List the controller's review message codes
    Messages(MessagesArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),

    /// Render the man page to stdout
    #[command(hide = true)]
    Man,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SNAPSHOT / WATCH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    /// Resource kinds to fetch (door, area, input, output, user)
    #[arg(long, value_delimiter = ',')]
    pub kind: Vec<EntityKind>,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Resource kinds to mirror
    #[arg(long, value_delimiter = ',')]
    pub kind: Vec<EntityKind>,

    /// Only print events of these categories
    #[arg(long, value_delimiter = ',')]
    pub category: Vec<EventCategory>,

    /// Do not tail the review log
    #[arg(long)]
    pub no_events: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  EVENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct EventsArgs {
    /// Keep polling and print events as they arrive
    #[arg(long, short = 'f')]
    pub follow: bool,

    /// Only show these categories (system, audit, access, security, hardware)
    #[arg(long, value_delimiter = ',')]
    pub category: Vec<EventCategory>,

    /// Start after this tick count
    #[arg(long, conflicts_with = "backfill")]
    pub since_ticks: Option<u64>,

    /// Start from whatever the controller returns first (default without --follow)
    #[arg(long)]
    pub backfill: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONTROL
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ControlArgs {
    /// Target kind (door, area, input, output)
    pub kind: EntityKind,

    /// Target entity id
    pub id: String,

    /// Action, e.g. unlock, timed-unlock, grant-access, arm, isolate, on
    pub action: String,

    /// Duration for timed-unlock (1-86399)
    #[arg(long)]
    pub seconds: Option<u32>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  MESSAGES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct MessagesArgs {
    /// Only list codes in this category
    #[arg(long)]
    pub category: Option<EventCategory>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store an API token in the system keyring (for --profile or the default)
    SetToken,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
