// ── Device Poller ──
//
// One reading request per device. Never fails: every error is logged
// and degrades to an empty reading so siblings are unaffected.

use tracing::{debug, warn};

use cubygas_api::{CloudClient, Error};

use crate::model::DeviceReading;
use crate::token::Token;

/// Fetch the current gas level for `device_id`.
///
/// Returns [`DeviceReading::empty`] immediately when no token is
/// available, and on any non-200 status, timeout, transport or decode
/// failure.
pub async fn fetch_reading(
    client: &CloudClient,
    token: Option<&Token>,
    device_id: &str,
) -> DeviceReading {
    let Some(token) = token else {
        debug!(device_id, "no token available, skipping gas level fetch");
        return DeviceReading::empty();
    };

    match client.fetch_reading(device_id, token.value()).await {
        Ok(resp) => DeviceReading::from(resp),
        Err(Error::Http { status, body }) => {
            warn!(device_id, status, body = %body, "gas level fetch failed");
            DeviceReading::empty()
        }
        Err(Error::Timeout { timeout_secs }) => {
            warn!(device_id, timeout_secs, "timeout fetching gas level");
            DeviceReading::empty()
        }
        Err(e) => {
            warn!(device_id, error = %e, "client error fetching gas level");
            DeviceReading::empty()
        }
    }
}
