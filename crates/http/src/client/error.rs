//! Client error types

use crate::token_store::TokenStoreError;
use crate::types::Detail;
use crate::validation::ValidationError;
use reqwest::StatusCode;
use std::fmt;
use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error; no response was received
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned a non-success status
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A form field failed its client-side check; nothing was sent
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Reading or writing the stored tokens failed
    #[error(transparent)]
    TokenStore(#[from] TokenStoreError),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The server answered successfully but not with what was expected
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// The API error carried by this error, if the server responded
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(error) => Some(error),
            _ => None,
        }
    }

    /// HTTP status of the failed response, if any
    pub fn status(&self) -> Option<StatusCode> {
        self.as_api().map(|error| error.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.as_api().is_some_and(ApiError::is_unauthorized)
    }

    pub fn is_conflict(&self) -> bool {
        self.as_api().is_some_and(ApiError::is_conflict)
    }

    /// Short message suitable for showing next to the triggering action
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(error) => error.detail().unwrap_or_else(|| error.to_string()),
            other => other.to_string(),
        }
    }
}

/// A response received with a non-success status
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ApiError {
    pub status: StatusCode,
    /// Canonical reason phrase of `status`, empty when unknown
    pub status_text: String,
    /// Raw response body text
    pub body: String,
}

impl ApiError {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body: body.into(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED
    }

    pub fn is_conflict(&self) -> bool {
        self.status == StatusCode::CONFLICT
    }

    /// The `detail` message of a `{"detail": "..."}` body
    pub fn detail(&self) -> Option<String> {
        serde_json::from_str::<Detail>(&self.body)
            .ok()
            .map(|body| body.detail)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "API {} {}: {}",
            self.status.as_u16(),
            self.status_text,
            self.body
        )
    }
}
