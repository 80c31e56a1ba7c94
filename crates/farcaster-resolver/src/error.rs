//! Error types for the address resolver binary

use std::fmt;

#[derive(Debug)]
pub enum ResolverError {
    Config(String),
    Io(Box<std::io::Error>),
    Json(serde_json::Error),
}

impl fmt::Display for ResolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolverError::Config(msg) => write!(f, "Configuration error: {}", msg),
            ResolverError::Io(err) => write!(f, "IO error: {}", err),
            ResolverError::Json(err) => write!(f, "JSON error: {}", err),
        }
    }
}

impl std::error::Error for ResolverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolverError::Io(err) => Some(err.as_ref()),
            ResolverError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ResolverError {
    fn from(err: std::io::Error) -> Self {
        ResolverError::Io(Box::new(err))
    }
}

impl From<serde_json::Error> for ResolverError {
    fn from(err: serde_json::Error) -> Self {
        ResolverError::Json(err)
    }
}

impl From<tracing_subscriber::filter::ParseError> for ResolverError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        ResolverError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ResolverError>;
