use thiserror::Error;

/// Top-level error type for the `leaflink-api` crate.
///
/// Covers every failure mode across all transport surfaces:
/// authentication, REST backend, broker link, and weather lookups.
/// `leaflink-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected (wrong credentials, unknown account, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Stored token rejected by the backend (`pass: false`).
    #[error("Session expired -- sign in again")]
    SessionExpired,

    /// No bearer token available for an authenticated call.
    #[error("Not signed in")]
    NotAuthenticated,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Backend API ─────────────────────────────────────────────────
    /// Structured error from the backend (non-2xx with a message body).
    #[error("Backend error (HTTP {status}): {message}")]
    Backend { message: String, status: u16 },

    // ── Broker ──────────────────────────────────────────────────────
    /// Publishing on the command topic failed (socket not ready, queue
    /// closed). Callers on the telemetry path treat this as "no update
    /// this cycle", never as a hard failure.
    #[error("Broker publish failed: {0}")]
    BrokerPublish(String),

    /// The broker connection could not be established.
    #[error("Broker connection failed: {0}")]
    BrokerConnect(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates the stored credential is
    /// no longer valid and re-authentication might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::SessionExpired | Self::NotAuthenticated)
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } | Self::BrokerPublish(_) | Self::BrokerConnect(_) => true,
            _ => false,
        }
    }
}
