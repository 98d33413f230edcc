//! Continuous polling until Ctrl-C (or `--count` snapshots).

use tracing::{debug, info};

use cubygas_core::{Coordinator, Snapshot};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::poll;

fn emit(global: &GlobalOpts, coordinator: &Coordinator, snapshot: &Snapshot, color: bool) {
    if global.quiet {
        return;
    }
    if matches!(global.output, OutputFormat::Table) {
        let at = coordinator
            .status()
            .last_published_at
            .map_or_else(|| "-".into(), |t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string());
        let header = format!(
            "── {at} · {}/{} devices reporting",
            snapshot.reporting_count(),
            snapshot.len()
        );
        eprintln!("{}", output::note_line(&header, color));
    }
    output::print_output(&poll::render_snapshot(&global.output, snapshot), false);
}

pub async fn handle(args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if args.interval == Some(0) {
        return Err(CliError::Validation {
            field: "interval".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    let config = config::resolve_coordinator_config(global, args.interval)?;
    if config.update_interval.is_zero() {
        return Err(CliError::Validation {
            field: "interval".into(),
            reason: "profile interval is 0; pass --interval".into(),
        });
    }

    let coordinator = Coordinator::new(config);
    coordinator.start().await?;

    let color = output::should_color(&global.color);
    let mut stream = coordinator.subscribe();
    let mut snapshot = stream.current().clone();
    let mut shown = 0usize;

    loop {
        emit(global, &coordinator, &snapshot, color);
        shown += 1;
        if args.count.is_some_and(|n| shown >= n) {
            debug!(shown, "snapshot count reached");
            break;
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, stopping");
                break;
            }
            next = stream.changed() => match next {
                Some(next) => snapshot = next,
                None => break,
            },
        }
    }

    coordinator.shutdown().await;
    Ok(())
}
