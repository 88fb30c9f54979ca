//! Centralized error handling for the refresh service
//!
//! Errors are grouped by the layer that raises them so a job body can decide
//! how loudly to report a failure before the executor swallows it.
//!
//! # Error Categories
//!
//! - **Source Errors**: provider authentication, HTTP status and parse failures
//! - **Storage Errors**: artifact directory creation, temp writes and renames
//! - **Scheduling Errors**: invalid job triggers
//! - **Configuration Errors**: unreadable or invalid configuration
//!
//! # Usage
//!
//! ```rust
//! use iptv_refresh::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::configuration("m3u_refresh_time is empty"))
//! }
//! assert!(example_function().is_err());
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Source Results
pub type SourceResult<T> = Result<T, SourceError>;

/// Convenience type alias for Storage Results
pub type StorageResult<T> = Result<T, StorageError>;
