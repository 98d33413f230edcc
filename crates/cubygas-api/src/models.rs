// Wire types for the token and gas-level endpoints.

use serde::{Deserialize, Serialize};

/// Body of `POST /token/{email}`.
#[derive(Debug, Serialize)]
pub struct TokenRequest<'a> {
    pub password: &'a str,
    /// Requested token lifetime in seconds.
    pub expiration: u64,
}

/// Successful token response.
///
/// `token` stays optional here so that a 200 without a token can be
/// reported as [`Error::MissingToken`](crate::Error::MissingToken)
/// instead of a decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub token: Option<String>,
    /// Lifetime the server granted, in seconds.
    #[serde(default)]
    pub expiration: Option<f64>,
}

/// Latest gas level for one device.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReadingResponse {
    #[serde(default)]
    pub level: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<String>,
}
