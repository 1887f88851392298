//! Error types for servicekit

use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

/// Result type alias using [`ServiceKitError`]
pub type Result<T> = std::result::Result<T, ServiceKitError>;

/// Main error type for servicekit
#[derive(Debug, Error)]
pub enum ServiceKitError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration parse error
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Missing or unusable service settings
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input rejected before any request was made
    #[error("{0}")]
    InvalidInput(String),

    /// Transport failure, surfaced as reported by the HTTP client
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The vendor answered with a non-success status
    #[error("{service}: {message}")]
    Status {
        service: &'static str,
        status: u16,
        message: String,
        /// Vendor error detail, when the body carried any
        errors: Vec<Value>,
    },

    /// The vendor answered successfully but the payload reports an error
    #[error("{service}: {message}")]
    Vendor {
        service: &'static str,
        message: String,
        inner: Value,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ServiceKitError {
    /// Build a non-success status error with the default message
    #[must_use]
    pub fn status(service: &'static str, status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            service,
            status,
            message: message.into(),
            errors: Vec::new(),
        }
    }

    /// HTTP status of a [`ServiceKitError::Status`] error
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The vendor-facing message, without the service prefix
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Status { message, .. } | Self::Vendor { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
