// ── Token Manager ──
//
// Obtains and caches the bearer token used by reading requests. The
// stored expiry is pulled in by a safety margin so the token is renewed
// before the server starts rejecting it.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use secrecy::SecretString;
use tracing::debug;

use cubygas_api::CloudClient;

use crate::clock::Clock;
use crate::config::Credentials;
use crate::error::CoreError;

/// Seconds subtracted from the granted lifetime.
pub const TOKEN_SAFETY_MARGIN_SECS: f64 = 30.0;

/// Floor for the locally tracked lifetime, so the margin never makes a
/// fresh token expire on arrival.
pub const TOKEN_MIN_LIFETIME_SECS: f64 = 30.0;

/// A bearer token and the instant it must be renewed.
#[derive(Debug, Clone)]
pub struct Token {
    value: SecretString,
    expires_at: DateTime<Utc>,
}

impl Token {
    pub fn new(value: SecretString, expires_at: DateTime<Utc>) -> Self {
        Self { value, expires_at }
    }

    pub fn value(&self) -> &SecretString {
        &self.value
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Local lifetime for a token the server granted for `granted_secs`.
///
/// `max(30, granted - 30)` seconds.
pub fn local_lifetime(granted_secs: f64) -> TimeDelta {
    let secs = (granted_secs - TOKEN_SAFETY_MARGIN_SECS).max(TOKEN_MIN_LIFETIME_SECS);
    Duration::try_from_secs_f64(secs)
        .ok()
        .and_then(|d| TimeDelta::from_std(d).ok())
        .unwrap_or(TimeDelta::MAX)
}

/// Perform one token request and stamp the result with its local expiry.
///
/// The lifetime echoed by the server wins; the requested one is used
/// when the response omits it. Expiry counts from the response's arrival.
pub async fn request_token(
    client: &CloudClient,
    credentials: &Credentials,
    requested_secs: u64,
    clock: &dyn Clock,
) -> Result<Token, CoreError> {
    let resp = client
        .request_token(&credentials.email, &credentials.password, requested_secs)
        .await?;

    let value = resp
        .token
        .ok_or_else(|| CoreError::from(cubygas_api::Error::MissingToken))?;

    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    let granted = resp.expiration.unwrap_or(requested_secs as f64);
    let expires_at = clock
        .now()
        .checked_add_signed(local_lifetime(granted))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    debug!(%expires_at, "token acquired");
    Ok(Token::new(SecretString::from(value), expires_at))
}

/// Owns the single token instance for one account.
///
/// Not shared: the coordinator holds it behind its cycle lock, so there
/// is never more than one writer.
#[derive(Debug)]
pub struct TokenManager {
    credentials: Credentials,
    requested_secs: u64,
    clock: Arc<dyn Clock>,
    token: Option<Token>,
}

impl TokenManager {
    pub fn new(credentials: Credentials, requested_secs: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            credentials,
            requested_secs,
            clock,
            token: None,
        }
    }

    /// The cached token, expired or not.
    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    /// `true` if there is no token or its local expiry has been reached.
    pub fn is_expired(&self) -> bool {
        self.token
            .as_ref()
            .is_none_or(|t| t.is_expired_at(self.clock.now()))
    }

    /// Return a usable token, requesting a new one first if needed.
    ///
    /// On failure the cached token (if any) is left untouched.
    pub async fn ensure_valid_token(&mut self, client: &CloudClient) -> Result<&Token, CoreError> {
        if self.is_expired() {
            let token = request_token(
                client,
                &self.credentials,
                self.requested_secs,
                self.clock.as_ref(),
            )
            .await?;
            self.token = Some(token);
        }

        self.token
            .as_ref()
            .ok_or_else(|| CoreError::Internal("token missing after refresh".into()))
    }

    /// Drop the cached token.
    pub fn clear(&mut self) {
        self.token = None;
    }
}
