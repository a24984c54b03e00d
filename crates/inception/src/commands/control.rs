//! `control`: send one command to an entity.

use inception_core::{ControlAction, Engine};

use crate::cli::{ControlArgs, GlobalOpts};
use crate::config;
use crate::error::CliError;

pub async fn handle(args: ControlArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let ControlArgs {
        kind,
        id,
        action,
        seconds,
    } = args;

    // Reject impossible commands before touching config or the network.
    let action = ControlAction::parse(&action, seconds)?;
    action.to_request(kind)?;

    let mut engine_config = config::resolve_engine_config(global)?;
    engine_config.sync.refresh.kinds = vec![kind];
    engine_config.sync.tailer.enabled = false;

    let target = id.clone();
    Engine::oneshot(engine_config, |engine| async move {
        engine.issue_command(kind, &target, action).await
    })
    .await?;

    if !global.quiet {
        eprintln!("✓ {action} sent to {kind} '{id}'");
    }
    Ok(())
}
