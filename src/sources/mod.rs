//! Provider session boundary
//!
//! A [`ProviderSession`] is the single authenticated conversation with the
//! IPTV provider. One session is created at startup and shared by every job;
//! its cookie store carries the login from [`ProviderSession::login`] into the
//! catalog and guide requests that follow. The control loop runs one job at a
//! time, so the session is never used concurrently.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::SourceResult;
use crate::models::{Category, Channel, Credentials};

pub mod digionline;
#[cfg(test)]
pub(crate) mod testing;

pub use digionline::DigiOnlineSession;

/// Authenticated access to the provider API
#[async_trait]
pub trait ProviderSession: Send + Sync {
    /// Authenticate the session; an `AuthenticationFailed` error carries the
    /// provider's message
    async fn login(&self, credentials: &Credentials) -> SourceResult<()>;

    /// All channel categories, in provider order
    async fn categories(&self) -> SourceResult<Vec<Category>>;

    /// Channels of one category, in provider order
    async fn channels(&self, category: &Category) -> SourceResult<Vec<Channel>>;

    /// Undecoded guide response for one stream and day
    ///
    /// The body is returned as-is, whatever the HTTP status, because the
    /// provider answers with the bare text `ERR` instead of JSON when it has
    /// no data. Only transport failures are errors.
    async fn epg_day_raw(&self, stream_id: &str, date: NaiveDate) -> SourceResult<String>;
}
