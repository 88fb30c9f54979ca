//! URL utilities for consistent URL handling
//!
//! Building the provider request URLs and the playback URLs written to the
//! playlist, plus masking credentials before a URL reaches the logs.

use chrono::NaiveDate;
use url::{form_urlencoded, Url};

/// Query parameters whose values never appear in logs
const SENSITIVE_PARAMS: [&str; 6] = ["username", "password", "user", "pass", "pwd", "passwd"];

/// URL utilities for consistent URL handling
pub struct UrlUtils;

impl UrlUtils {
    /// Replace credentials in a URL with asterisks for logging
    ///
    /// Both `user:pass@host` userinfo and well-known credential query
    /// parameters (matched case-insensitively) are masked. Strings that do not
    /// parse as URLs are returned unchanged.
    ///
    /// ```rust
    /// use iptv_refresh::utils::url::UrlUtils;
    ///
    /// assert_eq!(
    ///     UrlUtils::obfuscate_credentials("https://host/login?user=me&password=secret"),
    ///     "https://host/login?user=****&password=****"
    /// );
    /// ```
    pub fn obfuscate_credentials(url: &str) -> String {
        let mut parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(_) => return url.to_string(),
        };

        if !parsed.username().is_empty() || parsed.password().is_some() {
            let _ = parsed.set_username("****");
            let _ = parsed.set_password(Some("****"));
        }

        if parsed.query().is_some() {
            let pairs: Vec<(String, String)> = parsed
                .query_pairs()
                .map(|(key, value)| {
                    let value = if SENSITIVE_PARAMS
                        .iter()
                        .any(|param| key.eq_ignore_ascii_case(param))
                    {
                        "****".to_string()
                    } else {
                        value.into_owned()
                    };
                    (key.into_owned(), value)
                })
                .collect();
            parsed.query_pairs_mut().clear().extend_pairs(pairs);
        }

        parsed.to_string()
    }

    /// Playback URL handed to the player for one channel
    ///
    /// The endpoint and the raw metadata document are form-encoded into the
    /// query so the player plugin can resolve the stream itself.
    pub fn plugin_play_url(plugin_id: &str, endpoint: &str, metadata: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("action", "play")
            .append_pair("channel_endpoint", endpoint)
            .append_pair("channel_metadata", metadata)
            .finish();
        format!("plugin://{plugin_id}/?{query}")
    }

    /// Daily guide request for one stream
    pub fn epg_day_url(
        base: &str,
        date: NaiveDate,
        stream_id: &str,
    ) -> Result<Url, url::ParseError> {
        let date = date.format("%Y-%m-%d").to_string();
        Url::parse_with_params(
            base,
            &[
                ("action", "getEPG"),
                ("date", date.as_str()),
                ("id_stream", stream_id),
            ],
        )
    }

    /// Channel listing request for one category
    pub fn channels_url(base: &str, category: &str) -> Result<Url, url::ParseError> {
        Url::parse_with_params(base, &[("category", category)])
    }
}
