//! One-shot poll: run a single cycle and print the snapshot.

use tabled::Tabled;

use cubygas_core::{Coordinator, Snapshot};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct ReadingRow {
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Level (%)")]
    level: String,
    #[tabled(rename = "Measured")]
    timestamp: String,
}

fn table(snapshot: &Snapshot) -> String {
    let rows: Vec<ReadingRow> = snapshot
        .iter()
        .map(|(id, reading)| ReadingRow {
            device: id.to_owned(),
            level: output::format_level(reading.level),
            timestamp: reading.timestamp.clone().unwrap_or_else(|| "-".into()),
        })
        .collect();
    output::render_table(&rows)
}

fn plain(snapshot: &Snapshot) -> String {
    snapshot
        .iter()
        .map(|(id, reading)| format!("{id}\t{}", output::format_level(reading.level)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a snapshot in the requested format. Structured formats keep the
/// `{ device_id: { level, timestamp } }` shape.
pub fn render_snapshot(format: &OutputFormat, snapshot: &Snapshot) -> String {
    output::render_single(format, snapshot, table, plain)
}

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let coordinator = Coordinator::new(config::resolve_coordinator_config(global, None)?);
    let snapshot = coordinator.first_refresh().await?;

    let out = render_snapshot(&global.output, &snapshot);
    output::print_output(&out, global.quiet);
    Ok(())
}
