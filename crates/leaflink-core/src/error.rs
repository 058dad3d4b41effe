// ── Core error types ──
//
// User-facing errors from leaflink-core. These are NOT transport-specific --
// consumers never see HTTP status codes or broker packets directly. The
// `From<leaflink_api::Error>` impl translates transport-layer errors into
// domain-appropriate variants. Note that the telemetry path itself never
// propagates errors at all: publish failures, malformed payloads, and
// timeouts all degrade to "cache unchanged".

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the backend: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Plant not found: {uuid}")]
    PlantNotFound { uuid: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Operation rejected: {message}")]
    Rejected { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("Backend error: {message}")]
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

// ── Conversion from transport-layer errors ───────────────────────────

impl From<leaflink_api::Error> for CoreError {
    fn from(err: leaflink_api::Error) -> Self {
        match err {
            leaflink_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            leaflink_api::Error::SessionExpired => CoreError::AuthenticationFailed {
                message: "session expired -- sign in again".into(),
            },
            leaflink_api::Error::NotAuthenticated => CoreError::NotAuthenticated,
            leaflink_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            leaflink_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            leaflink_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            leaflink_api::Error::Backend { message, status } => CoreError::Api {
                message,
                status: Some(status),
            },
            leaflink_api::Error::BrokerPublish(reason)
            | leaflink_api::Error::BrokerConnect(reason) => {
                CoreError::ConnectionFailed { reason }
            }
            leaflink_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
