//! `watch`: run the engine and stream entity changes and events.

use tokio::sync::mpsc::UnboundedReceiver;

use inception_core::{Engine, EngineConfig, EventCategory, Notification, TailerStatus};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output::{self, Painter};

use super::rows;

pub async fn handle(
    mut config: EngineConfig,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if !args.kind.is_empty() {
        config.sync.refresh.kinds = args.kind;
    }
    if args.no_events {
        config.sync.tailer.enabled = false;
    }
    if !args.category.is_empty() {
        config.sync.disabled_categories = only(&args.category);
    }
    let url = config.url.clone();

    let engine = Engine::new(config)?;
    let (_, rx) = engine.channel_listener();
    engine.start().await;
    if !global.quiet {
        eprintln!("Watching {url} (Ctrl-C to stop)");
    }

    let result = stream(&engine, rx, global, false).await;
    engine.shutdown().await;
    result
}

/// Categories to switch off so that only `wanted` remain.
pub(super) fn only(wanted: &[EventCategory]) -> Vec<EventCategory> {
    EventCategory::ALL
        .into_iter()
        .filter(|c| !wanted.contains(c))
        .collect()
}

/// Print notifications until Ctrl-C, a re-authentication signal, or (when
/// `events_required`) the review log turning out to be unavailable.
pub(super) async fn stream(
    engine: &Engine,
    mut rx: UnboundedReceiver<Notification>,
    global: &GlobalOpts,
    events_required: bool,
) -> Result<(), CliError> {
    let painter = Painter::new(global.color);
    let mut status = engine.tailer_status();
    let mut tailing = true;

    if *status.borrow_and_update() == TailerStatus::Disabled {
        tailer_disabled(events_required)?;
        tailing = false;
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => return Ok(()),

            changed = status.changed(), if tailing => {
                if changed.is_err() {
                    tailing = false;
                } else if *status.borrow_and_update() == TailerStatus::Disabled {
                    tailer_disabled(events_required)?;
                    tailing = false;
                }
            }

            notification = rx.recv() => match notification {
                Some(Notification::EntityChanged(change)) => {
                    let line = match global.output {
                        OutputFormat::Json | OutputFormat::JsonCompact => output::json_line(&change)?,
                        _ => rows::change_line(&change, painter),
                    };
                    print(&line, global.quiet)?;
                }
                Some(Notification::Event(event)) => {
                    let line = match global.output {
                        OutputFormat::Json | OutputFormat::JsonCompact => output::json_line(event.as_ref())?,
                        _ => rows::event_line(&event, painter),
                    };
                    print(&line, global.quiet)?;
                }
                Some(Notification::ReauthRequired(origin)) => {
                    tracing::debug!(?origin, "controller rejected the token");
                    return Err(CliError::AuthFailed {
                        profile: String::new(),
                    });
                }
                None => return Ok(()),
            },
        }
    }
}

fn tailer_disabled(events_required: bool) -> Result<(), CliError> {
    if events_required {
        return Err(CliError::Unavailable {
            resource: "review log".into(),
        });
    }
    tracing::warn!("review log unavailable to this token; showing entity changes only");
    Ok(())
}

fn print(line: &str, quiet: bool) -> Result<(), CliError> {
    if quiet {
        return Ok(());
    }
    output::print_line(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_keeps_requested_categories() {
        let disabled = only(&[EventCategory::Access, EventCategory::Security]);
        assert_eq!(
            disabled,
            vec![
                EventCategory::System,
                EventCategory::Audit,
                EventCategory::Hardware
            ]
        );
    }
}
