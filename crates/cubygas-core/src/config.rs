// ── Runtime coordinator configuration ──
//
// These types describe *what* to poll and *how* to reach the cloud API.
// They carry credential data and connection tuning, but never touch disk.
// The host (CLI, service wrapper) builds a `CoordinatorConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use cubygas_api::{CloudClient, DEFAULT_BASE_URL, TlsMode, TransportConfig};

use crate::error::CoreError;

/// Token lifetime requested from the token endpoint.
pub const DEFAULT_TOKEN_EXPIRATION_SECS: u64 = 3600;

/// Interval between poll cycles.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(60);

/// Upper bound for each individual HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Account credentials. Immutable once the coordinator is built.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// Bundled root store (strict).
    #[default]
    SystemDefaults,
    /// Additionally trust a custom CA certificate file.
    CustomCa(PathBuf),
}

/// Where and how to reach the cloud API.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    /// API root (e.g., `https://cuby.cloud/api/v2`).
    pub base_url: Url,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            tls: TlsVerification::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ConnectionSettings {
    /// Settings pointing at a different API root, other fields default.
    pub fn with_base_url(base_url: Url) -> Self {
        Self {
            base_url,
            ..Self::default()
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            },
            timeout: self.request_timeout,
        }
    }

    /// Open a fresh HTTP session. Dropping the returned client releases
    /// its connection pool.
    pub fn session(&self) -> Result<CloudClient, CoreError> {
        Ok(CloudClient::new(self.base_url.clone(), &self.transport())?)
    }
}

/// Configuration for one coordinator (one account).
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub credentials: Credentials,
    /// Devices to poll, in display order. Duplicates are tolerated.
    pub device_ids: Vec<String>,
    pub connection: ConnectionSettings,
    /// Time between poll cycles. `Duration::ZERO` disables the ticker.
    pub update_interval: Duration,
    /// Token lifetime to request, in seconds.
    pub token_expiration_secs: u64,
}

impl CoordinatorConfig {
    /// Config with default connection settings and timings.
    pub fn new(credentials: Credentials, device_ids: Vec<String>) -> Self {
        Self {
            credentials,
            device_ids,
            connection: ConnectionSettings::default(),
            update_interval: DEFAULT_UPDATE_INTERVAL,
            token_expiration_secs: DEFAULT_TOKEN_EXPIRATION_SECS,
        }
    }
}

/// The production API root as a parsed URL.
pub fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("DEFAULT_BASE_URL is a valid URL")
}
