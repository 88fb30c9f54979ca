//! DigiOnline provider session over reqwest

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use super::ProviderSession;
use crate::config::ProviderConfig;
use crate::errors::{AppResult, SourceError, SourceResult};
use crate::models::{Category, Channel, Credentials};
use crate::utils::url::UrlUtils;

const SOURCE_TYPE: &str = "digionline";

/// Listing responses come either as a bare array or wrapped in `data`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListEnvelope<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl<T> ListEnvelope<T> {
    fn into_items(self) -> Vec<T> {
        match self {
            ListEnvelope::Bare(items) => items,
            ListEnvelope::Wrapped { data } => data,
        }
    }
}

/// Login responses may carry an error message even with a 2xx status
#[derive(Debug, Default, Deserialize)]
struct LoginReply {
    #[serde(default)]
    error: Option<String>,
}

/// Session against the DigiOnline web API
///
/// Holds one cookie-keeping `reqwest::Client` for the process lifetime.
pub struct DigiOnlineSession {
    client: Client,
    login_url: String,
    categories_url: String,
    channels_url: String,
    epg_url: String,
}

impl DigiOnlineSession {
    /// Build the HTTP client from the provider configuration
    pub fn new(config: &ProviderConfig) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,application/json,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));

        let client = Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;

        info!(
            "Provider session ready (timeout {})",
            humantime::format_duration(config.request_timeout)
        );

        Ok(Self {
            client,
            login_url: config.login_url.clone(),
            categories_url: config.categories_url.clone(),
            channels_url: config.channels_url.clone(),
            epg_url: config.epg_url.clone(),
        })
    }

    async fn get_text(&self, url: &str) -> SourceResult<String> {
        let safe_url = UrlUtils::obfuscate_credentials(url);
        let response = self.send_get(url, &safe_url).await?;
        let response = Self::check_status(response, &safe_url)?;
        Self::read_body(response, &safe_url).await
    }

    /// Body of a GET whatever the status; only transport failures are errors
    async fn get_text_any_status(&self, url: &str) -> SourceResult<String> {
        let safe_url = UrlUtils::obfuscate_credentials(url);
        let response = self.send_get(url, &safe_url).await?;
        let status = response.status();
        if !status.is_success() {
            debug!("{} answered {}, decoding the body anyway", safe_url, status.as_u16());
        }
        Self::read_body(response, &safe_url).await
    }

    async fn send_get(&self, url: &str, safe_url: &str) -> SourceResult<Response> {
        debug!("GET {}", safe_url);
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(safe_url, &e))
    }

    async fn read_body(response: Response, safe_url: &str) -> SourceResult<String> {
        let body = response
            .text()
            .await
            .map_err(|e| SourceError::from_reqwest(safe_url, &e))?;
        debug!("Received {} bytes from {}", body.len(), safe_url);
        Ok(body)
    }

    async fn get_list<T: DeserializeOwned>(&self, url: &str, what: &str) -> SourceResult<Vec<T>> {
        let body = self.get_text(url).await?;
        let envelope: ListEnvelope<T> = serde_json::from_str(&body)
            .map_err(|e| SourceError::parse(SOURCE_TYPE, format!("invalid {what} listing: {e}")))?;
        Ok(envelope.into_items())
    }

    fn check_status(response: Response, safe_url: &str) -> SourceResult<Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(SourceError::Http {
                status: status.as_u16(),
                message: format!(
                    "{} {} - URL: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown"),
                    safe_url
                ),
            })
        }
    }
}

#[async_trait]
impl ProviderSession for DigiOnlineSession {
    async fn login(&self, credentials: &Credentials) -> SourceResult<()> {
        let safe_url = UrlUtils::obfuscate_credentials(&self.login_url);
        debug!("Logging in as {} at {}", credentials.username, safe_url);

        let response = self
            .client
            .post(&self.login_url)
            .form(&[
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(safe_url.clone(), &e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SourceError::from_reqwest(safe_url.clone(), &e))?;

        if !status.is_success() {
            return Err(SourceError::auth_failed(
                SOURCE_TYPE,
                format!(
                    "login rejected with {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                ),
            ));
        }

        login_error_message(&body).map_or(Ok(()), |message| {
            Err(SourceError::auth_failed(SOURCE_TYPE, message))
        })
    }

    async fn categories(&self) -> SourceResult<Vec<Category>> {
        self.get_list(&self.categories_url, "category").await
    }

    async fn channels(&self, category: &Category) -> SourceResult<Vec<Channel>> {
        let url = UrlUtils::channels_url(&self.channels_url, &category.name).map_err(|e| {
            SourceError::parse(SOURCE_TYPE, format!("invalid channels URL: {e}"))
        })?;
        self.get_list(url.as_str(), "channel").await
    }

    async fn epg_day_raw(&self, stream_id: &str, date: NaiveDate) -> SourceResult<String> {
        let url = UrlUtils::epg_day_url(&self.epg_url, date, stream_id)
            .map_err(|e| SourceError::parse(SOURCE_TYPE, format!("invalid EPG URL: {e}")))?;
        // The provider pairs its `ERR` sentinel with error statuses, so the
        // body decides whether the day is usable
        self.get_text_any_status(url.as_str()).await
    }
}

/// Error message of a login reply, if the provider reported one
///
/// Non-JSON bodies (the login page itself, for instance) carry no error.
fn login_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<LoginReply>(body)
        .ok()
        .and_then(|reply| reply.error)
        .map(|message| message.trim().to_string())
        .filter(|message| !message.is_empty())
}
