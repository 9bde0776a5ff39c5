//! Typed translation of structured remote-API error payloads.
//!
//! A remote endpoint that fails at the application level answers with a
//! structured error object instead of a transport failure. This crate turns
//! that object, together with the URL that produced it, into [`ApiError`]:
//! a typed error with code-specific contextual messaging that callers can
//! branch on (reauthenticate, follow a redirect, give up).

use serde::Deserialize;
use thiserror::Error;

/// Authorization failed; the session behind the access token may be gone.
pub const CODE_AUTH_FAILED: i64 = 5;
/// Validation required; the payload carries a redirect URI to complete it.
pub const CODE_VALIDATION_REQUIRED: i64 = 17;

/// Error object embedded in a remote API error response.
///
/// Field names follow the wire format, so this deserializes directly from
/// the `error` member of an error response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorPayload {
    pub error_code: i64,
    pub error_msg: String,
    #[serde(default)]
    pub redirect_uri: Option<String>,
}

/// A remote API failure with enriched, code-specific messaging.
///
/// Always classified as a bad request (status 400). The original remote
/// error code and the requested URL stay queryable so callers can decide
/// what to do next.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    message: String,
    api_error_code: i64,
    request_url: String,
}

impl ApiError {
    /// Build an error from the remote payload and the URL that produced it.
    ///
    /// Known codes get contextual messaging before the payload message is
    /// wrapped: [`CODE_AUTH_FAILED`] with an "invalid session" message is
    /// prefixed with a reauthentication note, [`CODE_VALIDATION_REQUIRED`]
    /// has its redirect URI appended. Other codes pass through unchanged.
    pub fn new(payload: &ErrorPayload, request_url: impl Into<String>) -> Self {
        let mut message = payload.error_msg.clone();
        match payload.error_code {
            CODE_AUTH_FAILED if message.contains("invalid session") => {
                message = format!(
                    "Access token is expired (probably by app session terminating). \
                     It is necessary to create new token. {message}"
                );
            }
            CODE_VALIDATION_REQUIRED => {
                let uri = payload.redirect_uri.as_deref().unwrap_or_default();
                message = format!("{message}: {uri}");
            }
            _ => {}
        }
        Self {
            message,
            api_error_code: payload.error_code,
            request_url: request_url.into(),
        }
    }

    /// Fixed HTTP-like classification for remote API failures.
    pub fn status(&self) -> u16 {
        400
    }

    /// The error code reported by the remote API.
    pub fn api_error_code(&self) -> i64 {
        self.api_error_code
    }

    /// The URL of the request that triggered the error.
    pub fn request_url(&self) -> &str {
        &self.request_url
    }

    /// The enriched message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(code: i64, msg: &str) -> ErrorPayload {
        ErrorPayload {
            error_code: code,
            error_msg: msg.to_string(),
            redirect_uri: None,
        }
    }

    #[test]
    fn expired_session_gets_reauthentication_note() {
        let err = ApiError::new(
            &payload(CODE_AUTH_FAILED, "User authorization failed: invalid session."),
            "http://api.example.com/method",
        );

        assert!(err.message().contains("Access token is expired"));
        assert!(err.message().contains("invalid session"));
        assert_eq!(err.api_error_code(), 5);
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn auth_failure_without_invalid_session_is_unchanged() {
        let err = ApiError::new(
            &payload(CODE_AUTH_FAILED, "User authorization failed: no token."),
            "http://api.example.com/method",
        );

        assert_eq!(err.message(), "User authorization failed: no token.");
    }

    #[test]
    fn validation_required_appends_redirect_uri() {
        let mut p = payload(CODE_VALIDATION_REQUIRED, "Validation required");
        p.redirect_uri = Some("http://validate.example.com".to_string());

        let err = ApiError::new(&p, "http://api.example.com/method");

        assert_eq!(err.message(), "Validation required: http://validate.example.com");
    }

    #[test]
    fn unknown_code_passes_message_through() {
        let err = ApiError::new(&payload(100, "One of the parameters is missing"), "http://x");

        assert_eq!(err.message(), "One of the parameters is missing");
        assert_eq!(err.api_error_code(), 100);
        assert_eq!(err.status(), 400);
        assert_eq!(err.request_url(), "http://x");
    }

    #[test]
    fn display_matches_message() {
        let err = ApiError::new(&payload(6, "Too many requests per second"), "http://x");

        assert_eq!(err.to_string(), err.message());
    }

    #[test]
    fn payload_deserializes_from_wire_names() {
        let p: ErrorPayload = serde_json::from_str(
            r#"{"error_code": 17, "error_msg": "Validation required", "redirect_uri": "http://v"}"#,
        )
        .unwrap();

        assert_eq!(p.error_code, 17);
        assert_eq!(p.error_msg, "Validation required");
        assert_eq!(p.redirect_uri.as_deref(), Some("http://v"));
    }

    #[test]
    fn redirect_uri_defaults_to_none() {
        let p: ErrorPayload =
            serde_json::from_str(r#"{"error_code": 1, "error_msg": "Unknown error"}"#).unwrap();

        assert_eq!(p.redirect_uri, None);
    }
}
