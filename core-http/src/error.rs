use bridge_traits::{HttpResponse, TransportError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure categories callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// No response: unreachable server or timeout
    Network,
    /// 401
    Unauthorized,
    /// 403
    Forbidden,
    /// 404
    NotFound,
    /// 5xx
    ServerError,
    /// Any other failure status, or an unusable body
    Other,
}

/// What actually went wrong underneath a [`ClassifiedError`].
#[derive(Error, Debug, Clone)]
pub enum ErrorCause {
    #[error(transparent)]
    NoResponse(#[from] TransportError),

    #[error("HTTP status {}", .0.status)]
    Status(HttpResponse),

    #[error("Invalid response body: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    Request(String),
}

/// The error every [`ApiClient`](crate::ApiClient) call fails with.
///
/// Displays as the user-facing message; the raw cause stays reachable
/// through [`std::error::Error::source`] and [`ClassifiedError::cause`].
#[derive(Error, Debug, Clone)]
#[error("{user_message}")]
pub struct ClassifiedError {
    kind: ErrorKind,
    http_status: Option<u16>,
    user_message: String,
    #[source]
    cause: ErrorCause,
}

impl ClassifiedError {
    pub fn new(
        kind: ErrorKind,
        http_status: Option<u16>,
        user_message: impl Into<String>,
        cause: ErrorCause,
    ) -> Self {
        Self {
            kind,
            http_status,
            user_message: user_message.into(),
            cause,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// HTTP status, when the server answered.
    pub fn status(&self) -> Option<u16> {
        self.http_status
    }

    pub fn user_message(&self) -> &str {
        &self.user_message
    }

    pub fn cause(&self) -> &ErrorCause {
        &self.cause
    }

    pub fn is_auth_error(&self) -> bool {
        self.kind == ErrorKind::Unauthorized
    }

    pub fn is_network_error(&self) -> bool {
        self.kind == ErrorKind::Network
    }
}
