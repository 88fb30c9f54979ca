//! Shared fixtures for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use iptv_refresh::config::Config;
use iptv_refresh::errors::{SourceError, SourceResult};
use iptv_refresh::models::{Catalog, Category, Channel, Credentials};
use iptv_refresh::sources::ProviderSession;

/// Scripted provider: a fixed catalog and raw guide bodies per (stream, day)
#[derive(Default)]
pub struct ScriptedProvider {
    pub reject_login: Option<String>,
    pub catalog: Catalog,
    pub epg_days: HashMap<(String, NaiveDate), String>,
    pub epg_requests: Mutex<Vec<(String, NaiveDate)>>,
}

impl ScriptedProvider {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    pub fn with_epg_day(mut self, stream_id: &str, date: NaiveDate, body: &str) -> Self {
        self.epg_days
            .insert((stream_id.to_string(), date), body.to_string());
        self
    }

    pub fn epg_requests(&self) -> Vec<(String, NaiveDate)> {
        self.epg_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProviderSession for ScriptedProvider {
    async fn login(&self, _credentials: &Credentials) -> SourceResult<()> {
        match &self.reject_login {
            Some(message) => Err(SourceError::auth_failed("scripted", message.clone())),
            None => Ok(()),
        }
    }

    async fn categories(&self) -> SourceResult<Vec<Category>> {
        Ok(self.catalog.iter().map(|s| s.category.clone()).collect())
    }

    async fn channels(&self, category: &Category) -> SourceResult<Vec<Channel>> {
        Ok(self
            .catalog
            .iter()
            .find(|s| s.category.name == category.name)
            .map(|s| s.channels.clone())
            .unwrap_or_default())
    }

    async fn epg_day_raw(&self, stream_id: &str, date: NaiveDate) -> SourceResult<String> {
        self.epg_requests
            .lock()
            .unwrap()
            .push((stream_id.to_string(), date));
        Ok(self
            .epg_days
            .get(&(stream_id.to_string(), date))
            .cloned()
            .unwrap_or_else(|| "ERR".to_string()))
    }
}

pub fn channel(name: &str, stream_id: Option<&str>) -> Channel {
    let metadata = match stream_id {
        Some(id) => format!(r#"{{"new-info":{{"meta":{{"streamId":"{id}"}}}}}}"#),
        None => r#"{"new-info":{"meta":{}}}"#.to_string(),
    };
    Channel {
        name: name.to_string(),
        logo: format!("https://logos.example/{name}.png"),
        endpoint: format!("/{name}"),
        metadata,
    }
}

/// Config with valid credentials and artifacts under `data_path`
pub fn config_in(data_path: &Path) -> Config {
    let mut config = Config::default();
    config.provider.username = "viewer@example.com".to_string();
    config.provider.password = "secret".to_string();
    config.storage.data_path = data_path.to_path_buf();
    config
}

/// Minimal config file with the given refresh times
pub fn config_toml(m3u: &str, epg: &str) -> String {
    format!(
        "[provider]\nusername = \"viewer@example.com\"\npassword = \"secret\"\n\n[refresh]\nm3u_refresh_time = \"{m3u}\"\nepg_refresh_time = \"{epg}\"\n"
    )
}
