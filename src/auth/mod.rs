//! Identity-provider interactions and the session gate.
//!
//! Login goes through the provider's password sign-in REST endpoint
//! (`accounts:signInWithPassword`). Everything else only checks for a stored
//! session: commands touching the task document resolve the acting user as
//! `TD_USER` env var > session in state.toml, and fail with a not-logged-in
//! error when neither is present (the CLI analog of the login redirect).

use crate::config::{AuthConfig, Session, State, USER_ENV};
use crate::{Error, Result};
use serde::Deserialize;
use thiserror::Error as ThisError;

/// Errors that can occur during sign-in.
#[derive(Debug, ThisError)]
pub enum LoginError {
    /// Provider rejected the credentials (400 with an error body)
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// No API key configured for the identity provider
    #[error("No auth API key configured: set {0} or [auth] api-key in config.toml", crate::config::AUTH_KEY_ENV)]
    MissingApiKey,

    /// Network or other HTTP error
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Failed to parse the provider response
    #[error("Failed to parse sign-in response: {0}")]
    ParseError(String),
}

/// Successful sign-in response (only fields we care about).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    /// Stable user id; keys the task document
    pub local_id: String,
    pub email: String,
    /// Display name; may be empty for password-only accounts
    #[serde(default)]
    pub display_name: String,
    pub id_token: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Sign in with email and password via the identity provider.
pub fn sign_in(
    config: &AuthConfig,
    email: &str,
    password: &str,
) -> std::result::Result<SignInResponse, LoginError> {
    let api_key = config.resolved_api_key().ok_or(LoginError::MissingApiKey)?;
    let url = format!(
        "{}/accounts:signInWithPassword?key={}",
        config.api_base, api_key
    );

    let response = ureq::post(&url).send_json(serde_json::json!({
        "email": email,
        "password": password,
        "returnSecureToken": true,
    }));

    match response {
        Ok(resp) => resp
            .into_json()
            .map_err(|e| LoginError::ParseError(e.to_string())),
        Err(ureq::Error::Status(400, resp)) => {
            let reason = resp
                .into_json::<ApiErrorBody>()
                .map(|body| body.error.message)
                .unwrap_or_else(|_| "sign-in rejected".to_string());
            Err(LoginError::InvalidCredentials(reason))
        }
        Err(ureq::Error::Status(code, resp)) => {
            let body = resp.into_string().unwrap_or_default();
            Err(LoginError::HttpError(format!("HTTP {}: {}", code, body)))
        }
        Err(e) => Err(LoginError::HttpError(e.to_string())),
    }
}

/// The acting user for a command.
#[derive(Debug, Clone)]
pub struct UserIdentity {
    /// Store record key
    pub uid: String,
    /// Display name for report headers and filenames
    pub name: String,
}

/// Resolve the acting user: `TD_USER` env > session state.
///
/// Returns [`Error::NotLoggedIn`] when neither is set.
pub fn current_user(state: &State) -> Result<UserIdentity> {
    if let Ok(user) = std::env::var(USER_ENV) {
        if !user.trim().is_empty() {
            return Ok(UserIdentity {
                uid: user.clone(),
                name: user,
            });
        }
    }

    match &state.session {
        Some(session) => Ok(UserIdentity {
            uid: session.uid.clone(),
            name: display_name(session),
        }),
        None => Err(Error::NotLoggedIn),
    }
}

/// Display name for a session, falling back through email local-part to "User".
fn display_name(session: &Session) -> String {
    if !session.name.trim().is_empty() {
        return session.name.clone();
    }
    session
        .email
        .split('@')
        .next()
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "User".to_string())
}
