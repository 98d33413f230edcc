//! Polling core between `cubygas-api` and display consumers (CLI, services).
//!
//! This crate owns the token lifecycle, the per-device polling and the
//! published snapshot for one Cuby cloud account:
//!
//! - **[`Coordinator`]**: Central facade. [`first_refresh()`](Coordinator::first_refresh)
//!   produces the initial snapshot, [`start()`](Coordinator::start) additionally
//!   spawns the interval ticker, [`shutdown()`](Coordinator::shutdown) stops it
//!   and drops the token. Each cycle refreshes the token if needed, fans out
//!   one reading request per device and publishes a fresh [`Snapshot`].
//!
//! - **[`TokenManager`]**: Caches the bearer token with a safety margin on
//!   its expiry; any token failure aborts the cycle.
//!
//! - **[`poller::fetch_reading`]**: Per-device fetch that never fails; errors
//!   degrade to an empty [`DeviceReading`].
//!
//! - **[`SnapshotStream`]**: Subscription handle exposing `current()` /
//!   `latest()` / `changed()` for consumers that redraw on publish.
//!
//! - **[`setup`]**: Setup-form parsing and one-shot credential validation.
//!
//! - **[`GasLevelSensor`]**: Per-device entity view over a coordinator.

pub mod clock;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod model;
pub mod poller;
pub mod sensor;
pub mod setup;
pub mod stream;
pub mod token;

// ── Primary re-exports ──────────────────────────────────────────────
pub use clock::{Clock, SystemClock};
pub use config::{
    ConnectionSettings, CoordinatorConfig, Credentials, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_TOKEN_EXPIRATION_SECS, DEFAULT_UPDATE_INTERVAL, TlsVerification,
};
pub use coordinator::{Coordinator, CoordinatorState, CoordinatorStatus};
pub use error::CoreError;
pub use model::{DeviceReading, Snapshot};
pub use sensor::{GasLevelSensor, SensorAttributes, SensorState};
pub use setup::{SetupEntry, SetupError, SetupInput, validate_credentials};
pub use stream::SnapshotStream;
pub use token::{Token, TokenManager};
