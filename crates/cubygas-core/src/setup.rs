// ── Account setup ──
//
// Turns raw form input (email, password, comma-separated device ids)
// into a validated account entry. Validation is a single token request
// through the same code path the coordinator uses.

use thiserror::Error;
use tracing::{debug, warn};

use crate::clock::SystemClock;
use crate::config::{
    ConnectionSettings, CoordinatorConfig, Credentials, DEFAULT_TOKEN_EXPIRATION_SECS,
};
use crate::error::CoreError;
use crate::token;

/// Why a setup attempt was refused.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("email, password and at least one device id are required")]
    MissingFields,

    #[error("invalid credentials: {0}")]
    InvalidAuth(#[source] CoreError),
}

/// Raw setup input, as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct SetupInput {
    pub email: String,
    pub password: String,
    /// Comma-separated, e.g. `"ABC123, XYZ789"`.
    pub device_ids: String,
}

/// A validated account, ready to build a coordinator from.
#[derive(Debug, Clone)]
pub struct SetupEntry {
    /// Display title, `"Cuby Gas ({email})"`.
    pub title: String,
    pub credentials: Credentials,
    pub device_ids: Vec<String>,
}

impl SetupEntry {
    /// Coordinator config for this account with the given connection settings.
    pub fn into_config(self, connection: ConnectionSettings) -> CoordinatorConfig {
        let mut config = CoordinatorConfig::new(self.credentials, self.device_ids);
        config.connection = connection;
        config
    }
}

/// Split a comma-separated id list, trimming entries and dropping empty ones.
pub fn parse_device_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl SetupInput {
    /// Trim and split the input without touching the network.
    pub fn parse(&self) -> Result<SetupEntry, SetupError> {
        let email = self.email.trim();
        let password = self.password.trim();
        let device_ids = parse_device_ids(&self.device_ids);

        if email.is_empty() || password.is_empty() || device_ids.is_empty() {
            return Err(SetupError::MissingFields);
        }

        Ok(SetupEntry {
            title: format!("Cuby Gas ({email})"),
            credentials: Credentials::new(email, password),
            device_ids,
        })
    }
}

/// Check that `credentials` can obtain a token.
///
/// Opens its own short-lived session and requests a token with the
/// default lifetime; the token itself is discarded.
pub async fn validate_credentials(
    credentials: &Credentials,
    connection: &ConnectionSettings,
) -> Result<(), CoreError> {
    let session = connection.session()?;
    match token::request_token(
        &session,
        credentials,
        DEFAULT_TOKEN_EXPIRATION_SECS,
        &SystemClock,
    )
    .await
    {
        Ok(_) => {
            debug!(email = %credentials.email, "credentials validated");
            Ok(())
        }
        Err(e) => {
            warn!(email = %credentials.email, error = %e, "credential validation failed");
            Err(e)
        }
    }
}

/// Parse and validate setup input in one step.
pub async fn setup_entry(
    input: &SetupInput,
    connection: &ConnectionSettings,
) -> Result<SetupEntry, SetupError> {
    let entry = input.parse()?;
    validate_credentials(&entry.credentials, connection)
        .await
        .map_err(SetupError::InvalidAuth)?;
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{SetupError, SetupInput, parse_device_ids};

    #[test]
    fn device_ids_are_trimmed_and_filtered() {
        assert_eq!(
            parse_device_ids(" ABC123 , ,XYZ789,"),
            vec!["ABC123".to_string(), "XYZ789".to_string()]
        );
        assert!(parse_device_ids(" , ").is_empty());
    }

    #[test]
    fn parse_builds_titled_entry() {
        let input = SetupInput {
            email: "  me@example.com ".into(),
            password: " pw ".into(),
            device_ids: "A1,B2".into(),
        };

        let entry = input.parse().expect("valid input");
        assert_eq!(entry.title, "Cuby Gas (me@example.com)");
        assert_eq!(entry.credentials.email, "me@example.com");
        assert_eq!(entry.device_ids, vec!["A1".to_string(), "B2".to_string()]);
    }

    #[test]
    fn parse_rejects_blank_fields() {
        let blank_password = SetupInput {
            email: "me@example.com".into(),
            password: "   ".into(),
            device_ids: "A1".into(),
        };
        assert!(matches!(
            blank_password.parse(),
            Err(SetupError::MissingFields)
        ));

        let only_commas = SetupInput {
            email: "me@example.com".into(),
            password: "pw".into(),
            device_ids: ",,".into(),
        };
        assert!(matches!(only_commas.parse(), Err(SetupError::MissingFields)));
    }
}
