//! CLI error types with miette diagnostics.
//!
//! Maps core and config errors into user-facing errors with actionable
//! help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use cubygas_config::ConfigError;
use cubygas_core::{CoreError, SetupError};

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the Cuby cloud: {reason}")]
    #[diagnostic(
        code(cubygas::connection_failed),
        help(
            "Check your network connection and the API root.\n\
             Override it with --base-url or `cubygas config set base_url <url>`."
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Request timed out: {message}")]
    #[diagnostic(
        code(cubygas::timeout),
        help("Increase the timeout with --timeout or check cloud responsiveness.")
    )]
    Timeout { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(cubygas::auth_failed),
        help(
            "Verify the account email and password.\n\
             Run: cubygas config set-password"
        )
    )]
    AuthFailed { message: String },

    #[error("No password configured for profile '{profile}'")]
    #[diagnostic(
        code(cubygas::no_credentials),
        help(
            "Configure credentials with: cubygas config init\n\
             Or set the CUBYGAS_PASSWORD environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(cubygas::api_error))]
    ApiError { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(cubygas::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(cubygas::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: cubygas config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No profile configured and no --email given")]
    #[diagnostic(
        code(cubygas::no_config),
        help(
            "Create a profile with: cubygas config init\n\
             Expected at: {path}\n\
             Or pass --email and --device with CUBYGAS_PASSWORD set."
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(cubygas::config))]
    Config { message: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Validation { .. } | Self::NoConfig { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::Timeout { message } => CliError::Timeout { message },
            CoreError::ConnectionFailed { reason } => CliError::ConnectionFailed { reason },
            CoreError::Api { message, .. } | CoreError::Internal(message) => {
                CliError::ApiError { message }
            }
            CoreError::Config { message } => CliError::Config { message },
        }
    }
}

impl From<SetupError> for CliError {
    fn from(err: SetupError) -> Self {
        match err {
            SetupError::MissingFields => CliError::Validation {
                field: "setup".into(),
                reason: err.to_string(),
            },
            SetupError::InvalidAuth(core) => core.into(),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::ProfileNotFound { name, available } => {
                CliError::ProfileNotFound { name, available }
            }
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_failures_keep_distinct_exit_codes() {
        let auth = CliError::from(CoreError::AuthenticationFailed {
            message: "Token request failed: 401 - nope".into(),
        });
        let timeout = CliError::from(CoreError::Timeout {
            message: "after 10s".into(),
        });
        let conn = CliError::from(CoreError::ConnectionFailed {
            reason: "refused".into(),
        });

        assert_eq!(auth.exit_code(), exit_code::AUTH);
        assert_eq!(timeout.exit_code(), exit_code::TIMEOUT);
        assert_eq!(conn.exit_code(), exit_code::CONNECTION);
    }

    #[test]
    fn invalid_setup_auth_maps_through_core_error() {
        let err = CliError::from(SetupError::InvalidAuth(CoreError::AuthenticationFailed {
            message: "Token missing in response".into(),
        }));
        assert!(matches!(err, CliError::AuthFailed { .. }));

        let err = CliError::from(SetupError::MissingFields);
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }
}
