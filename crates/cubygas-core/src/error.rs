// ── Core error types ──
//
// Errors surfaced by the coordinator and the credential validator.
// The `From<cubygas_api::Error>` impl folds transport-layer failures
// into the handful of categories a host needs to report.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Token acquisition ────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out: {message}")]
    Timeout { message: String },

    #[error("Connection error: {reason}")]
    ConnectionFailed { reason: String },

    // ── Payload ──────────────────────────────────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Credentials were rejected or the token endpoint returned no token.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<cubygas_api::Error> for CoreError {
    fn from(err: cubygas_api::Error) -> Self {
        match err {
            cubygas_api::Error::Authentication { .. } | cubygas_api::Error::MissingToken => {
                CoreError::AuthenticationFailed {
                    message: err.to_string(),
                }
            }
            cubygas_api::Error::Timeout { timeout_secs } => CoreError::Timeout {
                message: format!("after {timeout_secs}s"),
            },
            cubygas_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout {
                        message: e.to_string(),
                    }
                } else {
                    CoreError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                }
            }
            cubygas_api::Error::Tls(reason) => CoreError::ConnectionFailed {
                reason: format!("TLS error: {reason}"),
            },
            cubygas_api::Error::Http { status, .. } => CoreError::Api {
                message: err.to_string(),
                status: Some(status),
            },
            cubygas_api::Error::Deserialization { message, body: _ } => CoreError::Api {
                message: format!("Deserialization error: {message}"),
                status: None,
            },
            cubygas_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            cubygas_api::Error::InvalidBaseUrl(url) => CoreError::Config {
                message: format!("Base URL cannot be used for API requests: {url}"),
            },
        }
    }
}
