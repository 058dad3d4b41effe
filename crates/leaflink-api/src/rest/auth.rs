// Auth endpoints: login, token verification, user profile.

use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use super::{Empty, RestClient};
use crate::error::Error;

/// Maximum attempts for the bootstrap token check.
const CHECK_TOKEN_MAX_ATTEMPTS: u32 = 3;

/// Initial backoff delay between token-check attempts; doubles per attempt.
const CHECK_TOKEN_INITIAL_DELAY: Duration = Duration::from_secs(1);

/// Response from `auth/login`.
///
/// `pass: false` with a 2xx status is the backend's way of signalling
/// bad credentials; it is not a transport error.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub pass: bool,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PassBody {
    pass: bool,
}

/// User profile from `user/get-user`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
}

impl RestClient {
    /// Sign in with email + password. Returns the bearer token on success,
    /// `Error::Authentication` when the backend rejects the credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<SecretString, Error> {
        let resp: LoginResponse = self
            .post("auth/login", &json!({ "email": email, "password": password }))
            .await?;

        match resp {
            LoginResponse {
                pass: true,
                token: Some(token),
            } => Ok(SecretString::from(token)),
            _ => Err(Error::Authentication {
                message: "login info didn't match".into(),
            }),
        }
    }

    /// Verify the attached bearer token with the backend.
    ///
    /// Bootstrap policy: transient failures are retried with capped
    /// exponential backoff (max [`CHECK_TOKEN_MAX_ATTEMPTS`] attempts).
    /// A definitive `pass: false` or 401 returns `Ok(false)` immediately —
    /// the token is dead and retrying won't revive it. Exhausting the
    /// retry budget also returns `Ok(false)`: the caller degrades to
    /// "not authenticated" without discarding the stored token, since the
    /// outage may be temporary.
    pub async fn check_token(&self) -> Result<bool, Error> {
        if self.token.is_none() {
            return Ok(false);
        }

        let mut delay = CHECK_TOKEN_INITIAL_DELAY;

        for attempt in 1..=CHECK_TOKEN_MAX_ATTEMPTS {
            match self.post_authed::<PassBody>("auth/check-token", &Empty {}).await {
                Ok(body) => return Ok(body.pass),
                Err(Error::SessionExpired) => return Ok(false),
                Err(e) if e.is_transient() && attempt < CHECK_TOKEN_MAX_ATTEMPTS => {
                    debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "token check failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(e) => {
                    warn!(error = %e, "token check failed after all retries");
                    return Ok(false);
                }
            }
        }

        Ok(false)
    }

    /// Fetch the signed-in user's profile.
    pub async fn get_user(&self) -> Result<UserProfile, Error> {
        self.post_authed("user/get-user", &Empty {}).await
    }
}
