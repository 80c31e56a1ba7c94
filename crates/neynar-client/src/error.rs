//! Error types for the Neynar API client

use std::fmt;

use reqwest::StatusCode;

/// Errors that can occur when talking to the Neynar API
#[derive(Debug)]
pub enum NeynarError {
    /// Transport failure: connect, timeout, or body read
    Http(Box<reqwest::Error>),
    /// The API key was rejected (401/403)
    Unauthorized(StatusCode),
    /// The endpoint answered 404
    NotFound,
    /// Any other non-success status
    Status(StatusCode),
    /// A success response whose body could not be parsed
    Json(serde_json::Error),
}

impl NeynarError {
    /// Whether the request may succeed if sent again.
    ///
    /// Credential failures, 404s and malformed bodies are permanent for a
    /// given request; everything else is treated as transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status(_))
    }
}

impl fmt::Display for NeynarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "Neynar HTTP error: {}", e),
            Self::Unauthorized(status) => write!(f, "Neynar rejected API key: {}", status),
            Self::NotFound => write!(f, "Neynar returned not found"),
            Self::Status(status) => write!(f, "Neynar API error: {}", status),
            Self::Json(e) => write!(f, "Neynar JSON parse error: {}", e),
        }
    }
}

impl std::error::Error for NeynarError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e.as_ref()),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for NeynarError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(Box::new(e))
    }
}

impl From<serde_json::Error> for NeynarError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Result type for Neynar API operations
pub type Result<T> = std::result::Result<T, NeynarError>;
