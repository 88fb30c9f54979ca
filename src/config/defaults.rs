/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Provider defaults
pub const DEFAULT_LOGIN_URL: &str = "https://www.digionline.ro/auth/login";
pub const DEFAULT_CATEGORIES_URL: &str = "https://www.digionline.ro/api/categories";
pub const DEFAULT_CHANNELS_URL: &str = "https://www.digionline.ro/api/channels";
pub const DEFAULT_EPG_URL: &str = "https://digiapis.rcs-rds.ro/digionline/api/v12/epg.php";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:102.0) Gecko/20100101 Firefox/102.0";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// Storage defaults
pub const DEFAULT_DATA_PATH: &str = "./data/pvr";
pub const DEFAULT_PLAYLIST_FILE_NAME: &str = "playlist.m3u8";
pub const DEFAULT_EPG_FILE_NAME: &str = "epg.xml";

// Refresh defaults
pub const DEFAULT_M3U_REFRESH_TIME: &str = "03:00";
pub const DEFAULT_EPG_REFRESH_TIME: &str = "03:30";

// Service defaults
pub const DEFAULT_STARTUP_GRACE_SECS: u64 = 15;
pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 1;
pub const DEFAULT_PLUGIN_ID: &str = "plugin.video.digionline";
