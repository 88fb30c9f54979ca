//! Utility modules for the refresh service
//!
//! Small, dependency-light helpers shared by the scheduler, the fetchers and
//! the artifact writers.

pub mod cron_helper;
pub mod time;
pub mod url;

pub use url::UrlUtils;
