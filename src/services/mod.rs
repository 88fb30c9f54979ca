//! Service layer for the refresh pipeline
//!
//! The service layer owns the provider session and turns one artifact refresh
//! into fetch, render and atomic write, logging what was produced.

pub mod refresh;

pub use refresh::{ArtifactReport, RefreshOutcome, RefreshService};
