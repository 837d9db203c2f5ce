// Dashboard HTTP client
//
// Wraps `reqwest::Client` with dashboard-specific URL construction, API-key
// header injection, and error-envelope parsing. All endpoint groups
// (devices, networks, vlans) are implemented as inherent methods in
// separate files to keep this module focused on transport mechanics.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::ErrorEnvelope;
use crate::transport::TransportConfig;

const API_KEY_HEADER: &str = "X-Cisco-Meraki-API-Key";

/// Raw HTTP client for the dashboard control-plane API.
///
/// Calls are synchronous from the caller's perspective: one request at a
/// time, no internal queuing or retry. Rate-limit responses surface as
/// [`Error::RateLimited`] and are the caller's problem -- the orchestration
/// layer deliberately performs no automatic retries.
pub struct DashboardClient {
    http: reqwest::Client,
    base_url: Url,
}

impl DashboardClient {
    /// Create a new client against the given API root
    /// (e.g. `https://api.meraki.com/api/v1/`).
    pub fn new(
        base_url: Url,
        api_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(api_key.expose_secret())
            .map_err(|_| Error::Authentication {
                message: "API key contains invalid header characters".into(),
            })?;
        key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key);

        let http = transport.build_client(headers)?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client` (tests).
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The API root URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a full URL under the API root.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        self.base_url.join(path).map_err(Error::InvalidUrl)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and deserialize the response body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!(%url, "GET");
        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        Self::parse_body(resp).await
    }

    /// Send a POST request with a JSON body, discarding the response body.
    pub(crate) async fn post(&self, url: Url, body: &impl Serialize) -> Result<(), Error> {
        debug!(%url, "POST");
        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;
        Self::check_status(resp).await.map(|_| ())
    }

    /// Send a POST request with no body, discarding the response body.
    pub(crate) async fn post_empty(&self, url: Url) -> Result<(), Error> {
        debug!(%url, "POST");
        let resp = self.http.post(url).send().await.map_err(Error::Transport)?;
        Self::check_status(resp).await.map(|_| ())
    }

    /// Send a PUT request with a JSON body, discarding the response body.
    pub(crate) async fn put(&self, url: Url, body: &impl Serialize) -> Result<(), Error> {
        debug!(%url, "PUT");
        let resp = self
            .http
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;
        Self::check_status(resp).await.map(|_| ())
    }

    // ── Response handling ────────────────────────────────────────────

    /// Check the status code, returning the raw body text on success.
    async fn check_status(resp: reqwest::Response) -> Result<String, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "API key rejected by the dashboard".into(),
            });
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = resp
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(1);
            return Err(Error::RateLimited { retry_after_secs });
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        if status.is_success() {
            return Ok(body);
        }

        // Failed calls carry `{ "errors": ["..."] }`; fall back to the raw
        // body when that shape doesn't parse.
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .ok()
            .filter(|env| !env.errors.is_empty())
            .map_or_else(|| body.trim().to_owned(), |env| env.errors.join("; "));

        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Check the status code and deserialize the body.
    async fn parse_body<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let body = Self::check_status(resp).await?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}
