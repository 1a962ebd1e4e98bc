//! Error types for XenAPI calls.

use thiserror::Error;

/// Errors returned by a [`XenApi`](crate::XenApi) backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The request never produced a response (connection refused, TLS, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a XenAPI error description.
    ///
    /// `code` is the first element of the description (e.g. `HANDLE_INVALID`),
    /// `params` are the remaining elements.
    #[error("XenAPI call failed: {code} {params:?}")]
    Failure {
        code: String,
        params: Vec<String>,
    },

    /// The response could not be decoded into the expected type.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Build a XenAPI failure from its code and parameters.
    pub fn failure<I, S>(code: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Failure {
            code: code.into(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    /// The XenAPI error code, if this is a server-side failure.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Failure { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Result type alias for XenAPI calls.
pub type Result<T> = std::result::Result<T, ApiError>;
