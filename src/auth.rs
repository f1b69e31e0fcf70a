// Email/password sign-in against the Identity Toolkit REST endpoint.
//
// Write operations are gated on a session token; this module produces that
// token and maps the backend's error codes to the messages shown in the
// auth panel.

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const IDENTITY_API_URL: &str = "https://identitytoolkit.googleapis.com/v1";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Please enter both email and password")]
    MissingCredentials,

    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    /// A rejection from the identity backend, already rendered as the
    /// message the auth panel shows.
    #[error("{message}")]
    Rejected { code: String, message: String },

    #[error("malformed auth response: {0}")]
    MalformedResponse(String),
}

/// Translate a backend rejection code into the operator-facing message.
fn rejection_message(code: &str) -> String {
    match code {
        "EMAIL_NOT_FOUND" => "No admin account found with this email".to_string(),
        "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => "Incorrect password".to_string(),
        "INVALID_EMAIL" => "Invalid email address".to_string(),
        "USER_DISABLED" => "This admin account has been disabled".to_string(),
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "Too many failed attempts. Try again later".to_string(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A signed-in session. Holding one unlocks the write operations.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub id_token: String,
    pub email: String,
    pub local_id: String,
    /// Token lifetime in seconds, string-encoded by the backend.
    pub expires_in: String,
}

// ---------------------------------------------------------------------------
// AuthClient
// ---------------------------------------------------------------------------

pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AuthClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(api_key, IDENTITY_API_URL)
    }

    /// Construct against an alternate endpoint (tests point this at a local
    /// mock server).
    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        AuthClient {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
        }
    }

    /// Exchange email + password for a session token.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        if email.trim().is_empty() || password.trim().is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let url = format!(
            "{}/accounts:signInWithPassword?key={}",
            self.base_url, self.api_key
        );
        let body = serde_json::json!({
            "email": email.trim(),
            "password": password,
            "returnSecureToken": true,
        });
        let response = self.http.post(&url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let code = extract_rejection_code(&text);
            warn!(%code, "sign-in rejected");
            let message = rejection_message(&code);
            return Err(AuthError::Rejected { code, message });
        }

        let session: AuthSession = serde_json::from_str(&text)
            .map_err(|e| AuthError::MalformedResponse(e.to_string()))?;
        info!(email = %session.email, "signed in");
        Ok(session)
    }
}

/// Pull the rejection code out of an error response body. The backend may
/// append detail after a colon ("TOO_MANY_ATTEMPTS_TRY_LATER : ..."); only
/// the leading code matters for the message mapping.
fn extract_rejection_code(body: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|parsed| {
            parsed
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "Authentication failed".to_string());
    message
        .split(':')
        .next()
        .unwrap_or(&message)
        .trim()
        .to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sign_in_requires_both_fields() {
        let client = AuthClient::new("key");
        let err = client.sign_in("", "secret").await.unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));
        let err = client.sign_in("a@b.c", "  ").await.unwrap_err();
        assert_eq!(err.to_string(), "Please enter both email and password");
    }

    #[test]
    fn rejection_codes_map_to_panel_messages() {
        assert_eq!(
            rejection_message("EMAIL_NOT_FOUND"),
            "No admin account found with this email"
        );
        assert_eq!(rejection_message("INVALID_PASSWORD"), "Incorrect password");
        assert_eq!(rejection_message("INVALID_EMAIL"), "Invalid email address");
        assert_eq!(
            rejection_message("USER_DISABLED"),
            "This admin account has been disabled"
        );
        assert_eq!(
            rejection_message("TOO_MANY_ATTEMPTS_TRY_LATER"),
            "Too many failed attempts. Try again later"
        );
        // Unrecognized codes pass through verbatim.
        assert_eq!(rejection_message("OPERATION_NOT_ALLOWED"), "OPERATION_NOT_ALLOWED");
    }

    #[test]
    fn rejection_code_extraction() {
        let body = r#"{ "error": { "code": 400, "message": "EMAIL_NOT_FOUND" } }"#;
        assert_eq!(extract_rejection_code(body), "EMAIL_NOT_FOUND");

        let body = r#"{ "error": { "message": "TOO_MANY_ATTEMPTS_TRY_LATER : Access temporarily disabled." } }"#;
        assert_eq!(extract_rejection_code(body), "TOO_MANY_ATTEMPTS_TRY_LATER");

        assert_eq!(extract_rejection_code("not json"), "Authentication failed");
    }

    #[test]
    fn session_parses_backend_shape() {
        let body = r#"{
            "kind": "identitytoolkit#VerifyPasswordResponse",
            "idToken": "tok-123",
            "email": "admin@example.com",
            "localId": "uid-1",
            "expiresIn": "3600",
            "registered": true
        }"#;
        let session: AuthSession = serde_json::from_str(body).unwrap();
        assert_eq!(session.id_token, "tok-123");
        assert_eq!(session.email, "admin@example.com");
        assert_eq!(session.expires_in, "3600");
    }
}
