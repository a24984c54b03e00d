//! `snapshot`: one refresh round, rendered.

use std::sync::Arc;

use inception_core::{Engine, EngineConfig, EntityRecord};

use crate::cli::{GlobalOpts, SnapshotArgs};
use crate::error::CliError;
use crate::output;

use super::rows::EntityRow;

pub async fn handle(
    mut config: EngineConfig,
    args: SnapshotArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if !args.kind.is_empty() {
        config.sync.refresh.kinds = args.kind;
    }
    config.sync.tailer.enabled = false;

    let snapshot = Engine::oneshot(config, |engine| async move { Ok(engine.snapshot()) }).await?;
    let records: Vec<Arc<EntityRecord>> = snapshot.records().cloned().collect();
    tracing::debug!(entities = records.len(), "snapshot fetched");

    let out = output::render_list(
        global.output,
        &records,
        |r| EntityRow::from(r.as_ref()),
        |r| r.key().to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
