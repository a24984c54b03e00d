//! Command dispatch: routes each subcommand to its handler.

pub mod config_cmd;
pub mod control;
pub mod events;
pub mod messages;
pub mod snapshot;
pub mod watch;

mod rows;

use std::io;

use clap::CommandFactory;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::config;
use crate::error::CliError;

pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        // ── Offline ─────────────────────────────────────────────────
        Command::Config(args) => config_cmd::handle(args, global),
        Command::Messages(args) => messages::handle(&args, global),
        Command::Completions(args) => {
            let mut cmd = Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "inception", &mut io::stdout());
            Ok(())
        }
        Command::Man => {
            clap_mangen::Man::new(Cli::command()).render(&mut io::stdout())?;
            Ok(())
        }

        // ── Controller ──────────────────────────────────────────────
        // Validates its arguments before resolving config.
        Command::Control(args) => control::handle(args, global).await,
        Command::Snapshot(args) => {
            snapshot::handle(config::resolve_engine_config(global)?, args, global).await
        }
        Command::Watch(args) => {
            watch::handle(config::resolve_engine_config(global)?, args, global).await
        }
        Command::Events(args) => {
            events::handle(config::resolve_engine_config(global)?, args, global).await
        }
    }
}
