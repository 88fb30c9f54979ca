//! In-memory provider session for unit tests

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Mutex;

use super::ProviderSession;
use crate::errors::{SourceError, SourceResult};
use crate::models::{Catalog, Category, CatalogSection, Channel, Credentials};

#[derive(Default)]
pub struct FakeSession {
    pub login_error: Option<String>,
    pub catalog: Catalog,
    /// Raw guide bodies by (stream id, date); anything missing answers `ERR`
    pub epg_days: HashMap<(String, NaiveDate), String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeSession {
    pub fn with_catalog(catalog: Catalog) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    pub fn rejecting_login(message: &str) -> Self {
        Self {
            login_error: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

pub fn channel(name: &str, stream_id: &str) -> Channel {
    Channel {
        name: name.to_string(),
        logo: format!("https://logos.example/{name}.png"),
        endpoint: format!("/{name}"),
        metadata: format!(r#"{{"new-info":{{"meta":{{"streamId":"{stream_id}"}}}}}}"#),
    }
}

pub fn section(name: &str, title: &str, channels: Vec<Channel>) -> CatalogSection {
    CatalogSection::named(name, title, channels)
}

#[async_trait]
impl ProviderSession for FakeSession {
    async fn login(&self, credentials: &Credentials) -> SourceResult<()> {
        self.record(format!("login {}", credentials.username));
        match &self.login_error {
            Some(message) => Err(SourceError::auth_failed("fake", message.clone())),
            None => Ok(()),
        }
    }

    async fn categories(&self) -> SourceResult<Vec<Category>> {
        self.record("categories".to_string());
        Ok(self
            .catalog
            .iter()
            .map(|section| section.category.clone())
            .collect())
    }

    async fn channels(&self, category: &Category) -> SourceResult<Vec<Channel>> {
        self.record(format!("channels {}", category.name));
        Ok(self
            .catalog
            .iter()
            .find(|section| section.category.name == category.name)
            .map(|section| section.channels.clone())
            .unwrap_or_default())
    }

    async fn epg_day_raw(&self, stream_id: &str, date: NaiveDate) -> SourceResult<String> {
        self.record(format!("epg {stream_id} {date}"));
        Ok(self
            .epg_days
            .get(&(stream_id.to_string(), date))
            .cloned()
            .unwrap_or_else(|| "ERR".to_string()))
    }
}
