//! Sensor entity listing after one poll cycle.

use tabled::Tabled;

use cubygas_core::{Coordinator, GasLevelSensor, SensorState};

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct SensorRow {
    #[tabled(rename = "Entity")]
    unique_id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Last Update")]
    last_update: String,
    #[tabled(rename = "Available")]
    available: bool,
}

impl From<&SensorState> for SensorRow {
    fn from(s: &SensorState) -> Self {
        Self {
            unique_id: s.unique_id.clone(),
            name: s.name.clone(),
            value: match s.value {
                Some(level) => format!("{level} {}", s.unit),
                None => "-".into(),
            },
            last_update: s.last_update.clone().unwrap_or_else(|| "-".into()),
            available: s.available,
        }
    }
}

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let coordinator = Coordinator::new(config::resolve_coordinator_config(global, None)?);
    coordinator.first_refresh().await?;

    let states: Vec<SensorState> = GasLevelSensor::for_coordinator(&coordinator)
        .iter()
        .map(GasLevelSensor::state)
        .collect();

    let out = output::render_list(&global.output, &states, |s| SensorRow::from(s), |s| {
        format!("{}\t{}", s.unique_id, output::format_level(s.value))
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
