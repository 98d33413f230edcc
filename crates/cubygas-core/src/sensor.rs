// ── Gas level sensor view ──
//
// Read-only per-device view over a coordinator, shaped the way display
// layers expect an entity: stable id, name, unit, value, attributes.

use serde::Serialize;

use crate::coordinator::Coordinator;

pub const GAS_LEVEL_UNIT: &str = "%";
pub const GAS_LEVEL_ICON: &str = "mdi:gas-cylinder";

/// Extra attributes shown next to the value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorAttributes {
    pub device_id: String,
    pub last_update: Option<String>,
}

/// Point-in-time rendering of a sensor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorState {
    pub unique_id: String,
    pub name: String,
    pub device_id: String,
    pub value: Option<f64>,
    pub unit: &'static str,
    pub last_update: Option<String>,
    pub available: bool,
}

/// Gas level of one device, backed by the coordinator's snapshot.
#[derive(Clone)]
pub struct GasLevelSensor {
    coordinator: Coordinator,
    device_id: String,
}

impl GasLevelSensor {
    pub fn new(coordinator: Coordinator, device_id: impl Into<String>) -> Self {
        Self {
            coordinator,
            device_id: device_id.into(),
        }
    }

    /// One sensor per configured device. Repeated ids yield one sensor.
    pub fn for_coordinator(coordinator: &Coordinator) -> Vec<Self> {
        let mut seen = std::collections::HashSet::new();
        coordinator
            .device_ids()
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .map(|id| Self::new(coordinator.clone(), id.clone()))
            .collect()
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn name(&self) -> String {
        format!("Cuby Gas Level {}", self.device_id)
    }

    pub fn unique_id(&self) -> String {
        format!("cuby_gas_level_{}", self.device_id)
    }

    pub fn unit(&self) -> &'static str {
        GAS_LEVEL_UNIT
    }

    pub fn icon(&self) -> &'static str {
        GAS_LEVEL_ICON
    }

    /// Current level, `None` if the device has no entry or no data.
    pub fn native_value(&self) -> Option<f64> {
        self.coordinator
            .reading(&self.device_id)
            .and_then(|r| r.level)
    }

    /// `None` until the device appears in a snapshot.
    pub fn attributes(&self) -> Option<SensorAttributes> {
        self.coordinator
            .reading(&self.device_id)
            .map(|r| SensorAttributes {
                device_id: self.device_id.clone(),
                last_update: r.timestamp,
            })
    }

    /// Mirrors the coordinator: unavailable after a failed cycle.
    pub fn available(&self) -> bool {
        self.coordinator.last_update_success()
    }

    pub fn state(&self) -> SensorState {
        let reading = self.coordinator.reading(&self.device_id).unwrap_or_default();
        SensorState {
            unique_id: self.unique_id(),
            name: self.name(),
            device_id: self.device_id.clone(),
            value: reading.level,
            unit: self.unit(),
            last_update: reading.timestamp,
            available: self.available(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::GasLevelSensor;
    use crate::config::{CoordinatorConfig, Credentials};
    use crate::coordinator::Coordinator;

    fn coordinator(ids: &[&str]) -> Coordinator {
        Coordinator::new(CoordinatorConfig::new(
            Credentials::new("me@example.com", "pw"),
            ids.iter().map(|s| (*s).to_owned()).collect(),
        ))
    }

    #[test]
    fn naming_follows_device_id() {
        let sensor = GasLevelSensor::new(coordinator(&["A1"]), "A1");
        assert_eq!(sensor.name(), "Cuby Gas Level A1");
        assert_eq!(sensor.unique_id(), "cuby_gas_level_A1");
        assert_eq!(sensor.unit(), "%");
        assert_eq!(sensor.icon(), "mdi:gas-cylinder");
    }

    #[test]
    fn no_value_before_first_snapshot() {
        let sensor = GasLevelSensor::new(coordinator(&["A1"]), "A1");
        assert_eq!(sensor.native_value(), None);
        assert_eq!(sensor.attributes(), None);
        assert!(!sensor.available());
    }

    #[test]
    fn one_sensor_per_distinct_device() {
        let sensors = GasLevelSensor::for_coordinator(&coordinator(&["A1", "B2", "A1"]));
        let ids: Vec<_> = sensors.iter().map(GasLevelSensor::device_id).collect();
        assert_eq!(ids, vec!["A1", "B2"]);
    }
}
