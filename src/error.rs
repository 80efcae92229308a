//! Error types for the proxy
//!
//! Provides unified error handling using thiserror. Every variant carries enough
//! context to be rendered at the HTTP boundary without re-interpretation.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, warn};

// == Field Error ==
/// A single failed validation rule on a request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Name of the offending field
    pub field: String,
    /// Human-readable description of the failure
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

// == Proxy Error Enum ==
/// Unified error type for the proxy.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Upstream rejected the login handshake
    #[error("Invalid MFL credentials")]
    InvalidCredentials,

    /// The login handshake exceeded its deadline
    #[error("Login timeout. MFL may be slow or credentials are incorrect.")]
    LoginTimeout,

    /// No live session for the supplied credential
    #[error("{0}")]
    SessionExpired(String),

    /// The session has no membership for the requested league
    #[error("League not found in your account: {0}")]
    LeagueNotFound(String),

    /// Network or HTTP failure while talking to the upstream API
    #[error("Failed to fetch data from MFL API: {message}")]
    UpstreamFetch {
        /// Upstream HTTP status, when one was received
        status: Option<u16>,
        message: String,
    },

    /// Upstream response did not have the expected shape
    #[error("Invalid MFL response format: {0}")]
    MalformedResponse(String),

    /// Upstream write action answered with an embedded error marker
    #[error("{0}")]
    RequestRejected(String),

    /// Request body or parameters failed validation
    #[error("Validation error")]
    Validation(Vec<FieldError>),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    /// Builds an [`ProxyError::UpstreamFetch`] from a transport failure.
    pub fn from_transport(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "MFL API request timed out".to_string()
        } else {
            err.to_string()
        };

        ProxyError::UpstreamFetch {
            status: err.status().map(|s| s.as_u16()),
            message,
        }
    }

    /// Returns the HTTP status this error renders with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ProxyError::LoginTimeout => StatusCode::REQUEST_TIMEOUT,
            ProxyError::SessionExpired(_) => StatusCode::UNAUTHORIZED,
            ProxyError::LeagueNotFound(_) => StatusCode::NOT_FOUND,
            ProxyError::UpstreamFetch { .. } => StatusCode::BAD_GATEWAY,
            ProxyError::MalformedResponse(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::RequestRejected(_) => StatusCode::BAD_REQUEST,
            ProxyError::Validation(_) => StatusCode::BAD_REQUEST,
            ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            ProxyError::UpstreamFetch {
                status: Some(status),
                ..
            } => Some(json!({ "upstreamStatus": status })),
            ProxyError::Validation(fields) => Some(json!(fields)),
            _ => None,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }

        let mut body = json!({
            "success": false,
            "message": self.to_string(),
        });
        if let Some(details) = self.details() {
            body["details"] = details;
        }

        (status, Json(body)).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the proxy.
pub type Result<T> = std::result::Result<T, ProxyError>;
