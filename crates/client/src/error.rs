use thiserror::Error;

use parcelhub_core::DomainError;

/// Everything that can go wrong talking to the API.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiError {
    /// The request never produced a response (connection refused, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("http {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Http { status: u16, message: Option<String> },

    /// The response body did not have the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The mutation was refused locally and never sent.
    #[error("rejected: {0}")]
    Rejected(#[from] DomainError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Terminal failures will not succeed on a plain retry.
    ///
    /// 4xx responses, decode failures, local rejections and configuration
    /// errors are terminal; network failures and 5xx are transient.
    pub fn is_terminal(&self) -> bool {
        match self {
            ApiError::Network(_) => false,
            ApiError::Http { status, .. } => *status < 500,
            ApiError::Decode(_) | ApiError::Rejected(_) | ApiError::Config(_) => true,
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, ApiError::Http { status: 401 | 403, .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ApiError::Http { status: 404, .. } | ApiError::Rejected(DomainError::NotFound)
        )
    }

    /// Message suitable for showing to a person, if the failure carried one.
    pub fn server_message(&self) -> Option<String> {
        match self {
            ApiError::Http { message, .. } => message.clone(),
            ApiError::Rejected(err) => Some(err.message()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if err.is_builder() {
            ApiError::Config(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::Http {
                status: status.as_u16(),
                message: None,
            }
        } else {
            ApiError::Network(err.to_string())
        }
    }
}
