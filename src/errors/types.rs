//! Error type definitions for the refresh service
//!
//! The hierarchy mirrors the failure taxonomy of a refresh cycle: provider
//! failures abort one artifact's cycle, storage failures abort the write, and
//! neither is allowed to escape the job executor.

use std::path::PathBuf;
use thiserror::Error;

use crate::job_scheduling::JobSchedulingError;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Provider (upstream API) errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Artifact storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Job scheduling errors
    #[error("Scheduling error: {0}")]
    Scheduling(#[from] JobSchedulingError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Provider specific errors
#[derive(Error, Debug)]
pub enum SourceError {
    /// Login rejected by the provider
    #[error("Authentication failed: {source_type} - {message}")]
    AuthenticationFailed { source_type: String, message: String },

    /// Request did not complete within the configured timeout
    #[error("Connection timeout: {url}")]
    Timeout { url: String },

    /// Request could not be sent or its body could not be read
    #[error("Connection failed: {url} - {message}")]
    Connection { url: String, message: String },

    /// Non-success HTTP status from the provider
    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Parse error: {source_type} - {message}")]
    ParseError { source_type: String, message: String },
}

/// Artifact storage errors, always carrying the offending path
#[derive(Error, Debug)]
pub enum StorageError {
    /// Directory creation failed
    #[error("Failed to create directory: {path:?} - {source}")]
    DirectoryCreation {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Writing the temporary file failed
    #[error("Failed to write file: {path:?} - {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Moving the temporary file over the artifact failed
    #[error("Failed to rename {from:?} to {to:?} - {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether this error is a rejected login
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Source(SourceError::AuthenticationFailed { .. }))
    }
}

impl SourceError {
    /// Create an authentication failed error
    pub fn auth_failed<S: Into<String>, M: Into<String>>(source_type: S, message: M) -> Self {
        Self::AuthenticationFailed {
            source_type: source_type.into(),
            message: message.into(),
        }
    }

    /// Classify a transport error for the (already obfuscated) URL
    pub fn from_reqwest<U: Into<String>>(url: U, error: &reqwest::Error) -> Self {
        let url = url.into();
        if error.is_timeout() {
            Self::Timeout { url }
        } else if let Some(status) = error.status() {
            Self::Http {
                status: status.as_u16(),
                message: format!("{url}: {error}"),
            }
        } else {
            Self::Connection {
                url,
                message: error.to_string(),
            }
        }
    }

    /// Create a parse error
    pub fn parse<S: Into<String>, M: Into<String>>(source_type: S, message: M) -> Self {
        Self::ParseError {
            source_type: source_type.into(),
            message: message.into(),
        }
    }
}
