//! Credential check: one token request, token discarded.

use serde::Serialize;

use cubygas_core::validate_credentials;

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct ValidationReport {
    title: String,
    email: String,
    device_ids: Vec<String>,
    valid: bool,
}

fn detail(report: &ValidationReport) -> String {
    format!(
        "{}: credentials valid\nDevices: {}",
        report.title,
        report.device_ids.join(", ")
    )
}

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let config = config::resolve_coordinator_config(global, None)?;
    validate_credentials(&config.credentials, &config.connection).await?;

    let report = ValidationReport {
        title: format!("Cuby Gas ({})", config.credentials.email),
        email: config.credentials.email.clone(),
        device_ids: config.device_ids.clone(),
        valid: true,
    };
    let out = output::render_single(&global.output, &report, detail, |_| "valid".into());
    output::print_output(&out, global.quiet);
    Ok(())
}
