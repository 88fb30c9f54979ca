//! Fetching the provider data a refresh cycle turns into artifacts
//!
//! [`catalog`] logs in and walks categories and channels; [`epg`] pulls the
//! three-day guide of each channel and repairs the days the provider fails to
//! serve.

pub mod catalog;
pub mod epg;

pub use catalog::fetch_catalog;
pub use epg::{fetch_day, fetch_guide, fetch_window, parse_epg_day, EpgDay, GuideFetch, EPG_SENTINEL};
