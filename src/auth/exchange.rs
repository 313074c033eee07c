//! Backend exchanger: the one POST that turns a provider credential into a
//! session, plus the two authenticated calls the client replays the bearer
//! token against. No call here is retried automatically; a failed attempt is
//! reported and left to the user.

use crate::auth::{acquirer::AuthCredential, error::AuthError, session::Session};
use crate::APP_USER_AGENT;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info_span, Instrument};

use super::session::User;

const EXCHANGE_PATH: &str = "/api/auth/google";
const PROFILE_PATH: &str = "/api/auth/profile";
const LOGOUT_PATH: &str = "/api/auth/logout";

/// Request timeout applied to every backend call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct Exchanger {
    base_url: String,
    client: reqwest::Client,
}

impl Exchanger {
    /// # Errors
    /// Returns `AuthError::Config` when the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| AuthError::Config(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    /// Exchange a provider credential for a session.
    ///
    /// # Errors
    /// `NetworkError` when the request cannot complete, `BackendRejected`
    /// on a non-2xx status or a `success:false` body, `MalformedResponse`
    /// when a claimed success is missing the token or user.
    pub async fn exchange(&self, credential: &AuthCredential) -> Result<Session, AuthError> {
        let url = join_url(&self.base_url, EXCHANGE_PATH);
        let payload = match credential {
            AuthCredential::IdentityToken(token) => json!({ "credential": token }),
            AuthCredential::AuthorizationCode { code, redirect_uri } => {
                json!({ "code": code, "redirect_uri": redirect_uri })
            }
        };

        let span = info_span!("auth.exchange", http.method = "POST", url = %url);
        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .instrument(span)
            .await
            .map_err(network_error)?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(AuthError::BackendRejected {
                status: Some(status.as_u16()),
                message: backend_message(&body, status.as_u16()),
            });
        }

        let json_response: Value = serde_json::from_str(&body)
            .map_err(|err| AuthError::MalformedResponse(format!("invalid JSON: {err}")))?;

        if json_response.get("success").and_then(Value::as_bool) != Some(true) {
            return Err(AuthError::BackendRejected {
                status: Some(status.as_u16()),
                message: backend_message(&body, status.as_u16()),
            });
        }

        let token = json_response
            .get("token")
            .and_then(Value::as_str)
            .ok_or_else(|| AuthError::MalformedResponse("no token in response".to_string()))?;

        let user: User = json_response
            .get("user")
            .cloned()
            .ok_or_else(|| AuthError::MalformedResponse("no user in response".to_string()))
            .and_then(|value| {
                serde_json::from_value(value)
                    .map_err(|err| AuthError::MalformedResponse(format!("invalid user: {err}")))
            })?;

        debug!("credential exchanged for {}", user.email);

        Ok(Session::new(SecretString::from(token.to_string()), user))
    }

    /// Fetch the profile behind the bearer token. `None` means the backend no
    /// longer honors the session (401); the caller destroys it.
    ///
    /// # Errors
    /// `NetworkError` when the request cannot complete, `BackendRejected` on
    /// any other non-2xx status, `MalformedResponse` on a body without a user.
    pub async fn profile(&self, token: &SecretString) -> Result<Option<User>, AuthError> {
        let url = join_url(&self.base_url, PROFILE_PATH);

        let span = info_span!("auth.profile", http.method = "GET", url = %url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token.expose_secret())
            .send()
            .instrument(span)
            .await
            .map_err(network_error)?;

        let status = response.status();
        if status.as_u16() == 401 {
            return Ok(None);
        }

        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(AuthError::BackendRejected {
                status: Some(status.as_u16()),
                message: backend_message(&body, status.as_u16()),
            });
        }

        let json_response: Value = serde_json::from_str(&body)
            .map_err(|err| AuthError::MalformedResponse(format!("invalid JSON: {err}")))?;

        let user = json_response
            .get("user")
            .cloned()
            .ok_or_else(|| AuthError::MalformedResponse("no user in response".to_string()))
            .and_then(|value| {
                serde_json::from_value(value)
                    .map_err(|err| AuthError::MalformedResponse(format!("invalid user: {err}")))
            })?;

        Ok(Some(user))
    }

    /// Invalidate the session on the backend. Callers treat this as
    /// best-effort; a failure never blocks local clearing.
    ///
    /// # Errors
    /// `NetworkError` when the request cannot complete, `BackendRejected` on
    /// a non-2xx status.
    pub async fn logout(&self, token: &SecretString) -> Result<(), AuthError> {
        let url = join_url(&self.base_url, LOGOUT_PATH);

        let span = info_span!("auth.logout", http.method = "POST", url = %url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(token.expose_secret())
            .send()
            .instrument(span)
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::BackendRejected {
                status: Some(status.as_u16()),
                message: backend_message(&body, status.as_u16()),
            });
        }

        Ok(())
    }
}

fn network_error(err: reqwest::Error) -> AuthError {
    AuthError::NetworkError(err.to_string())
}

/// Pull the backend's own message out of an error body, falling back to the
/// HTTP status when there is none.
fn backend_message(body: &str, status: u16) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json.get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("request failed with status {status}"))
}

fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    format!("{}/{}", base, path.trim_start_matches('/'))
}
