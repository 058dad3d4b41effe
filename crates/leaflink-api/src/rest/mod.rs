// Backend HTTP client
//
// Wraps `reqwest::Client` with Leaflink-specific URL construction and
// bearer-token injection. All endpoint groups (auth, plants) are
// implemented as inherent methods via separate files to keep this module
// focused on transport mechanics.

mod auth;
mod plants;

pub use auth::{LoginResponse, UserProfile};
pub use plants::{DeviceCredential, PlantRecord};

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;

/// Default request timeout for backend calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Raw HTTP client for the Leaflink REST backend.
///
/// The backend speaks plain JSON over POST for every endpoint. Calls that
/// require authentication take the bearer token from the client; the token
/// is optional so that login itself can run through the same client.
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
}

impl RestClient {
    /// Create a new client for the given backend base URL.
    pub fn new(base_url: Url) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("leaflink/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url,
            token: None,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// Used by tests and by callers that share one HTTP client across
    /// backend and weather lookups.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            token: None,
        }
    }

    /// Attach a bearer token for authenticated endpoints.
    pub fn with_token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }

    /// Replace the bearer token in place (after login).
    pub fn set_token(&mut self, token: SecretString) {
        self.token = Some(token);
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build a full URL for a backend path, e.g. `auth/login`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send an unauthenticated POST with a JSON body.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        let url = self.api_url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        Self::parse_response(resp).await
    }

    /// Send a bearer-authenticated POST with a JSON body.
    ///
    /// Fails with [`Error::NotAuthenticated`] when no token is attached.
    pub(crate) async fn post_authed<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        let token = self.token.as_ref().ok_or(Error::NotAuthenticated)?;
        let url = self.api_url(path)?;
        debug!("POST {url} (authed)");

        let resp = self
            .http
            .post(url)
            .bearer_auth(token.expose_secret())
            .json(body)
            .send()
            .await?;
        Self::parse_response(resp).await
    }

    /// Parse a backend response: 401 becomes [`Error::SessionExpired`],
    /// other non-2xx statuses surface the body's `message` field when
    /// present, and 2xx bodies deserialize into `T`.
    async fn parse_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::SessionExpired);
        }

        let body = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map_or_else(|_| format!("HTTP {status}"), |e| e.message);
            return Err(Error::Backend {
                message,
                status: status.as_u16(),
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}

/// Error body shape the backend uses for 4xx responses.
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    message: String,
}

/// Empty JSON body for endpoints that take no parameters.
#[derive(Debug, Serialize)]
pub(crate) struct Empty {}
