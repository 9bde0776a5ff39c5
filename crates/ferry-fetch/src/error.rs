//! Error types for ferry-fetch.

use thiserror::Error;

/// Why a fetch could not be configured or completed.
///
/// Nothing here is retried internally; every failure is surfaced to the
/// immediate caller, which owns the retry/fallback/abort decision.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// No usable transport mechanism. Fatal, not retryable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The caller asked for an HTTPS fetch that the current
    /// transport/proxy configuration cannot provide. Raised before any
    /// network I/O.
    #[error(
        "cannot send request through HTTPS protocol to '{url}'; only HTTP is allowed by configuration and arguments"
    )]
    HttpsNotAllowed { url: String },

    /// Network or transport failure, or a non-success status code.
    #[error("cannot retrieve data from URL '{url}': {message}")]
    Retrieval {
        url: String,
        /// Best-available HTTP-like status; 500 when undeterminable.
        status: u16,
        message: String,
    },
}

impl FetchError {
    pub(crate) fn retrieval(url: &str, status: u16, message: impl Into<String>) -> Self {
        FetchError::Retrieval {
            url: url.to_string(),
            status,
            message: message.into(),
        }
    }

    /// HTTP-like status code of this failure, where one is derivable.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            FetchError::Configuration(_) => Some(500),
            FetchError::HttpsNotAllowed { .. } => None,
            FetchError::Retrieval { status, .. } => Some(*status),
        }
    }
}
