use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::errors::{AppError, AppResult};
use crate::models::{ArtifactKind, Credentials};

pub mod defaults;
pub mod duration_serde;
pub mod schedule;

pub use schedule::{FileScheduleSource, RefreshSchedule, ScheduleSource};

use defaults::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub provider: ProviderConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub service: ServiceConfig,
}

/// Provider account and endpoint configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub username: String,
    pub password: String,
    #[serde(default = "default_login_url")]
    pub login_url: String,
    #[serde(default = "default_categories_url")]
    pub categories_url: String,
    #[serde(default = "default_channels_url")]
    pub channels_url: String,
    #[serde(default = "default_epg_url")]
    pub epg_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Upper bound for a single upstream request
    #[serde(default = "default_request_timeout", with = "duration_serde::duration")]
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,
    #[serde(default = "default_playlist_file_name")]
    pub playlist_file_name: String,
    #[serde(default = "default_epg_file_name")]
    pub epg_file_name: String,
}

/// Times of day ("HH:MM", local time) at which each artifact is regenerated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_m3u_refresh_time")]
    pub m3u_refresh_time: String,
    #[serde(default = "default_epg_refresh_time")]
    pub epg_refresh_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Delay before the first scheduling pass so the network can settle
    #[serde(default = "default_startup_grace", with = "duration_serde::duration")]
    pub startup_grace: Duration,
    /// How long the control loop waits for shutdown between scheduler passes
    #[serde(default = "default_tick_interval", with = "duration_serde::duration")]
    pub tick_interval: Duration,
    /// Plugin id used to build playback URLs in the playlist
    #[serde(default = "default_plugin_id")]
    pub plugin_id: String,
}

// Provider defaults
fn default_login_url() -> String {
    DEFAULT_LOGIN_URL.to_string()
}

fn default_categories_url() -> String {
    DEFAULT_CATEGORIES_URL.to_string()
}

fn default_channels_url() -> String {
    DEFAULT_CHANNELS_URL.to_string()
}

fn default_epg_url() -> String {
    DEFAULT_EPG_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
}

// Storage defaults
fn default_data_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_PATH)
}

fn default_playlist_file_name() -> String {
    DEFAULT_PLAYLIST_FILE_NAME.to_string()
}

fn default_epg_file_name() -> String {
    DEFAULT_EPG_FILE_NAME.to_string()
}

// Refresh defaults
fn default_m3u_refresh_time() -> String {
    DEFAULT_M3U_REFRESH_TIME.to_string()
}

fn default_epg_refresh_time() -> String {
    DEFAULT_EPG_REFRESH_TIME.to_string()
}

// Service defaults
fn default_startup_grace() -> Duration {
    Duration::from_secs(DEFAULT_STARTUP_GRACE_SECS)
}

fn default_tick_interval() -> Duration {
    Duration::from_secs(DEFAULT_TICK_INTERVAL_SECS)
}

fn default_plugin_id() -> String {
    DEFAULT_PLUGIN_ID.to_string()
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("username", &self.username)
            .field("password", &"****")
            .field("login_url", &self.login_url)
            .field("categories_url", &self.categories_url)
            .field("channels_url", &self.channels_url)
            .field("epg_url", &self.epg_url)
            .field("user_agent", &self.user_agent)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ProviderConfig {
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.username.clone(), self.password.clone())
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            login_url: default_login_url(),
            categories_url: default_categories_url(),
            channels_url: default_channels_url(),
            epg_url: default_epg_url(),
            user_agent: default_user_agent(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl StorageConfig {
    /// Full path of the artifact of the given kind
    pub fn artifact_path(&self, kind: ArtifactKind) -> PathBuf {
        match kind {
            ArtifactKind::Playlist => self.data_path.join(&self.playlist_file_name),
            ArtifactKind::Epg => self.data_path.join(&self.epg_file_name),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            playlist_file_name: default_playlist_file_name(),
            epg_file_name: default_epg_file_name(),
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            m3u_refresh_time: default_m3u_refresh_time(),
            epg_refresh_time: default_epg_refresh_time(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            startup_grace: default_startup_grace(),
            tick_interval: default_tick_interval(),
            plugin_id: default_plugin_id(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            storage: StorageConfig::default(),
            refresh: RefreshConfig::default(),
            service: ServiceConfig::default(),
        }
    }
}

impl Config {
    /// Load the configuration, writing a default file first if none exists
    pub fn load_from_file<P: AsRef<Path>>(config_file: P) -> AppResult<Self> {
        let config_file = config_file.as_ref();
        if config_file.exists() {
            Self::read_from_file(config_file)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config).map_err(|e| {
                AppError::configuration(format!("Failed to render default config: {e}"))
            })?;
            std::fs::write(config_file, contents).map_err(|e| {
                AppError::configuration(format!(
                    "Failed to write default config {}: {e}",
                    config_file.display()
                ))
            })?;
            info!("Created default config file: {}", config_file.display());
            Ok(default_config)
        }
    }

    /// Parse an existing configuration file without creating it
    pub fn read_from_file<P: AsRef<Path>>(config_file: P) -> AppResult<Self> {
        let config_file = config_file.as_ref();
        let contents = std::fs::read_to_string(config_file).map_err(|e| {
            AppError::configuration(format!("Failed to read {}: {e}", config_file.display()))
        })?;
        toml::from_str(&contents).map_err(|e| {
            AppError::configuration(format!("Failed to parse {}: {e}", config_file.display()))
        })
    }

    /// Check the values a refresh cycle depends on
    pub fn validate(&self) -> AppResult<()> {
        if self.provider.username.trim().is_empty() || self.provider.password.is_empty() {
            return Err(AppError::configuration(
                "provider.username and provider.password must be set",
            ));
        }
        if self.storage.playlist_file_name.trim().is_empty()
            || self.storage.epg_file_name.trim().is_empty()
        {
            return Err(AppError::configuration(
                "storage.playlist_file_name and storage.epg_file_name must not be empty",
            ));
        }
        if self.service.tick_interval.is_zero() {
            return Err(AppError::configuration("service.tick_interval must be positive"));
        }
        RefreshSchedule::from_config(&self.refresh)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [provider]
            username = "viewer@example.com"
            password = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.provider.epg_url, DEFAULT_EPG_URL);
        assert_eq!(config.provider.request_timeout, Duration::from_secs(30));
        assert_eq!(config.refresh.m3u_refresh_time, "03:00");
        assert_eq!(config.service.startup_grace, Duration::from_secs(15));
        assert_eq!(config.service.tick_interval, Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_artifact_paths() {
        let storage = StorageConfig {
            data_path: PathBuf::from("/var/lib/pvr"),
            playlist_file_name: "channels.m3u8".to_string(),
            epg_file_name: "guide.xml".to_string(),
        };
        assert_eq!(
            storage.artifact_path(ArtifactKind::Playlist),
            PathBuf::from("/var/lib/pvr/channels.m3u8")
        );
        assert_eq!(
            storage.artifact_path(ArtifactKind::Epg),
            PathBuf::from("/var/lib/pvr/guide.xml")
        );
    }

    #[test]
    fn test_load_creates_default_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let config = Config::load_from_file(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.refresh, RefreshConfig::default());

        // A second load parses the file that was just written
        let reloaded = Config::load_from_file(&path).unwrap();
        assert_eq!(reloaded.storage.epg_file_name, DEFAULT_EPG_FILE_NAME);
    }

    #[test]
    fn test_validate_rejects_bad_refresh_time() {
        let mut config = Config::default();
        config.provider.username = "viewer".to_string();
        config.provider.password = "secret".to_string();
        config.refresh.epg_refresh_time = "25:99".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let mut provider = ProviderConfig::default();
        provider.password = "hunter2".to_string();
        let rendered = format!("{provider:?}");
        assert!(!rendered.contains("hunter2"));
    }
}
