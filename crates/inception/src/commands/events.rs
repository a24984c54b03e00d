//! `events`: read the review log once, or follow it.

use inception_core::{CursorStart, Engine, EngineConfig, Notification, TailOutcome};

use crate::cli::{EventsArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::rows::EventRow;
use super::watch;

/// Where reading starts: an explicit tick count, the first page the
/// controller returns, or (when following) only new events.
fn cursor_start(args: &EventsArgs) -> CursorStart {
    match args.since_ticks {
        Some(ticks) => CursorStart::Ticks(ticks),
        None if args.backfill || !args.follow => CursorStart::Backfill,
        None => CursorStart::Now,
    }
}

pub async fn handle(
    mut config: EngineConfig,
    args: EventsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    config.sync.refresh.kinds.clear();
    config.sync.tailer.enabled = true;
    config.sync.tailer.cursor_start = cursor_start(&args);
    config.sync.events_enabled = true;
    if !args.category.is_empty() {
        config.sync.disabled_categories = watch::only(&args.category);
    }

    let engine = Engine::new(config)?;
    let (_, mut rx) = engine.channel_listener();

    if args.follow {
        engine.start().await;
        let result = watch::stream(&engine, rx, global, true).await;
        engine.shutdown().await;
        return result;
    }

    let outcome = engine.poll_events_now().await;
    engine.shutdown().await;
    match outcome? {
        TailOutcome::Disabled => {
            return Err(CliError::Unavailable {
                resource: "review log".into(),
            });
        }
        outcome => tracing::debug!(?outcome, "review round finished"),
    }

    let mut events = Vec::new();
    while let Ok(notification) = rx.try_recv() {
        if let Notification::Event(event) = notification {
            events.push(event);
        }
    }

    let out = output::render_list(
        global.output,
        &events,
        |e| EventRow::from(e.as_ref()),
        |e| e.event_id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(follow: bool, backfill: bool, since_ticks: Option<u64>) -> EventsArgs {
        EventsArgs {
            follow,
            category: Vec::new(),
            since_ticks,
            backfill,
        }
    }

    #[test]
    fn cursor_start_depends_on_follow() {
        assert_eq!(cursor_start(&args(false, false, None)), CursorStart::Backfill);
        assert_eq!(cursor_start(&args(true, false, None)), CursorStart::Now);
        assert_eq!(cursor_start(&args(true, true, None)), CursorStart::Backfill);
        assert_eq!(
            cursor_start(&args(false, false, Some(42))),
            CursorStart::Ticks(42)
        );
    }
}
