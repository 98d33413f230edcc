// ── Snapshot model ──
//
// The only state the coordinator exposes: one reading per configured
// device, rebuilt from scratch every poll cycle.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use cubygas_api::ReadingResponse;

/// Latest gas level of one device. Both fields are `None` when the
/// device could not be read this cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceReading {
    /// Fill level in percent.
    pub level: Option<f64>,
    /// Server-side timestamp of the measurement, passed through verbatim.
    pub timestamp: Option<String>,
}

impl DeviceReading {
    /// The reading recorded for a device whose fetch failed.
    pub const fn empty() -> Self {
        Self {
            level: None,
            timestamp: None,
        }
    }

    /// `true` if either field carries a value.
    pub fn has_data(&self) -> bool {
        self.level.is_some() || self.timestamp.is_some()
    }
}

impl From<ReadingResponse> for DeviceReading {
    fn from(resp: ReadingResponse) -> Self {
        Self {
            level: resp.level,
            timestamp: resp.timestamp,
        }
    }
}

/// Complete result of one poll cycle: `device_id -> reading`.
///
/// Keys keep the configured device order, so two cycles over identical
/// upstream data serialize to identical bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    readings: IndexMap<String, DeviceReading>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Pair each configured id with the result at the same position.
    ///
    /// Missing trailing results are filled with [`DeviceReading::empty`],
    /// so the key set always equals the configured id set.
    pub(crate) fn from_results(device_ids: &[String], results: Vec<DeviceReading>) -> Self {
        let mut results = results.into_iter();
        device_ids
            .iter()
            .map(|id| (id.clone(), results.next().unwrap_or_default()))
            .collect()
    }

    pub fn get(&self, device_id: &str) -> Option<&DeviceReading> {
        self.readings.get(device_id)
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DeviceReading)> {
        self.readings.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn device_ids(&self) -> impl Iterator<Item = &str> {
        self.readings.keys().map(String::as_str)
    }

    /// Number of devices that returned data this cycle.
    pub fn reporting_count(&self) -> usize {
        self.readings.values().filter(|r| DeviceReading::has_data(r)).count()
    }
}

impl FromIterator<(String, DeviceReading)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (String, DeviceReading)>>(iter: I) -> Self {
        Self {
            readings: iter.into_iter().collect(),
        }
    }
}
