// Cloud API HTTP client
//
// Wraps `reqwest::Client` with endpoint URL construction and response
// classification for the two calls the service exposes: token
// acquisition and the latest gas level of a single device.

use std::time::Duration;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{ReadingResponse, TokenRequest, TokenResponse};
use crate::transport::{DEFAULT_TIMEOUT, TransportConfig};

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://cuby.cloud/api/v2";

/// Raw HTTP client for the cloud API.
///
/// Holds no authentication state: the token is passed into every
/// reading call by the caller, which owns its lifecycle.
#[derive(Debug, Clone)]
pub struct CloudClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl CloudClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the API root, e.g. [`DEFAULT_BASE_URL`].
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            timeout: transport.timeout,
        })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The API root this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Append path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `{base}/token/{email}`
    pub fn token_url(&self, email: &str) -> Result<Url, Error> {
        self.endpoint(&["token", email])
    }

    /// `{base}/history/gas/level/{device_id}` (token not included).
    pub fn reading_url(&self, device_id: &str) -> Result<Url, Error> {
        self.endpoint(&["history", "gas", "level", device_id])
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Request a bearer token for `email`, asking for `expiration_secs`
    /// of lifetime.
    ///
    /// A non-200 answer becomes [`Error::Authentication`] carrying the
    /// status and body text; a 200 without a non-empty `token` becomes
    /// [`Error::MissingToken`].
    pub async fn request_token(
        &self,
        email: &str,
        password: &SecretString,
        expiration_secs: u64,
    ) -> Result<TokenResponse, Error> {
        let url = self.token_url(email)?;
        debug!(path = url.path(), "POST token");

        let body = TokenRequest {
            password: password.expose_secret(),
            expiration: expiration_secs,
        };

        let resp = self
            .http
            .post(url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = self.decode(resp).await?;
        match token.token.as_deref() {
            Some(t) if !t.is_empty() => {
                debug!("token acquired");
                Ok(token)
            }
            _ => Err(Error::MissingToken),
        }
    }

    /// Fetch the latest gas level for one device.
    pub async fn fetch_reading(
        &self,
        device_id: &str,
        token: &SecretString,
    ) -> Result<ReadingResponse, Error> {
        let mut url = self.reading_url(device_id)?;
        debug!(path = url.path(), "GET gas level");
        url.query_pairs_mut()
            .append_pair("token", token.expose_secret());

        let resp = self
            .http
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                body,
            });
        }

        self.decode(resp).await
    }

    // ── Response helpers ─────────────────────────────────────────────

    /// Map a send/receive failure, pulling timeouts out into their own variant.
    fn classify(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }

    async fn decode<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T, Error> {
        let body = resp.text().await.map_err(|e| self.classify(e))?;
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }
}
