//! Unified error type for calls made through the request gateway.
//!
//! Every failed call resolves to exactly one `ClientError`. The response
//! policy has already notified the user (and, for `Unauthorized`, torn the
//! session down) by the time the caller sees it.

use reqwest::StatusCode;
use teamall_core::EnvelopeError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::router::NavigationError;

/// Client-level error type.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend rejected the operation inside a successful HTTP response.
    #[error("{message}")]
    Business {
        /// Message from the envelope, or a generic fallback.
        message: String,
    },

    /// HTTP 401. The session has been cleared.
    #[error("Unauthorized")]
    Unauthorized,

    /// HTTP 403.
    #[error("Forbidden")]
    Forbidden,

    /// HTTP 404.
    #[error("Not found")]
    NotFound,

    /// HTTP 500 or any other non-2xx status.
    #[error("Server error ({status})")]
    Server {
        status: StatusCode,
        /// `message` field of the error body, if the backend sent one.
        message: Option<String>,
    },

    /// No response was received.
    #[error("Network error: {0}")]
    Network(String),

    /// The request could not be built or sent.
    #[error("Request configuration error: {0}")]
    RequestConfig(String),

    /// A successful payload did not have the expected shape.
    #[error("Decode error: {0}")]
    Decode(#[from] EnvelopeError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Navigation target did not resolve.
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),
}

impl ClientError {
    /// HTTP status for transport-level failures.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            Self::Forbidden => Some(StatusCode::FORBIDDEN),
            Self::NotFound => Some(StatusCode::NOT_FOUND),
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this is an HTTP 401.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;
