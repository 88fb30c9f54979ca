//! Provider catalog and guide data
//!
//! Everything here is produced fresh by a refresh cycle and thrown away once
//! the artifact has been written; nothing is persisted on its own.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod serde_helpers;

use crate::errors::SourceError;
use serde_helpers::{i64_from_string_or_number, json_blob, null_as_empty, string_or_number};

/// The two files this service maintains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    /// Channel list with playback URLs
    Playlist,
    /// XMLTV programme guide
    Epg,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 2] = [ArtifactKind::Playlist, ArtifactKind::Epg];

    /// Tag of the daily refresh job for this artifact
    pub fn tag(self) -> &'static str {
        match self {
            ArtifactKind::Playlist => "m3u",
            ArtifactKind::Epg => "EPG",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Provider account credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new<U: Into<String>, P: Into<String>>(username: U, password: P) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"****")
            .finish()
    }
}

/// A channel category as listed by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
}

impl Category {
    pub fn new<N: Into<String>, T: Into<String>>(name: N, title: T) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
        }
    }
}

/// A channel as listed inside a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub logo: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub endpoint: String,
    /// JSON document, kept encoded because it is passed through to the player
    #[serde(default, deserialize_with = "json_blob")]
    pub metadata: String,
}

#[derive(Debug, Deserialize)]
struct ChannelMetadata {
    #[serde(rename = "new-info")]
    new_info: NewInfo,
}

#[derive(Debug, Deserialize)]
struct NewInfo {
    meta: StreamMeta,
}

#[derive(Debug, Deserialize)]
struct StreamMeta {
    #[serde(rename = "streamId", deserialize_with = "string_or_number")]
    stream_id: String,
}

impl Channel {
    /// Provider stream id from `metadata["new-info"]["meta"]["streamId"]`
    pub fn stream_id(&self) -> Result<String, SourceError> {
        let metadata: ChannelMetadata = serde_json::from_str(&self.metadata).map_err(|e| {
            SourceError::parse(
                "channel metadata",
                format!("channel '{}' has no usable streamId: {e}", self.name),
            )
        })?;
        let stream_id = metadata.new_info.meta.stream_id;
        if stream_id.trim().is_empty() {
            return Err(SourceError::parse(
                "channel metadata",
                format!("channel '{}' has an empty streamId", self.name),
            ));
        }
        Ok(stream_id)
    }
}

/// One category and its channels, in provider order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSection {
    pub category: Category,
    pub channels: Vec<Channel>,
}

impl CatalogSection {
    pub fn new(category: Category, channels: Vec<Channel>) -> Self {
        Self { category, channels }
    }

    /// A section for the category `name`, titled `title`
    pub fn named<N: Into<String>, T: Into<String>>(name: N, title: T, channels: Vec<Channel>) -> Self {
        Self::new(Category::new(name, title), channels)
    }
}

/// The full catalog of one refresh cycle
pub type Catalog = Vec<CatalogSection>;

/// One programme of a daily guide
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpgEntry {
    #[serde(deserialize_with = "i64_from_string_or_number")]
    pub start_ts: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub program_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub program_description: String,
    #[serde(
        rename = "program_description_l",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub program_description_localized: String,
}

/// Raw shape of one EPG day as returned by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpgDayResponse {
    #[serde(default)]
    pub meta: EpgMeta,
    pub data: EpgDayData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpgMeta {
    #[serde(default, deserialize_with = "string_or_number")]
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpgDayData {
    #[serde(deserialize_with = "string_or_number")]
    pub id_stream: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub stream_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub stream_desc: String,
    #[serde(default)]
    pub epg: Vec<EpgEntry>,
}

/// Version reported in substituted day records
pub const SYNTHETIC_EPG_VERSION: &str = "6";

impl EpgDayResponse {
    /// Empty-schedule record used in place of a day the provider failed to serve
    pub fn empty_for(stream_id: &str, channel_name: &str) -> Self {
        Self {
            meta: EpgMeta {
                version: SYNTHETIC_EPG_VERSION.to_string(),
            },
            data: EpgDayData {
                id_stream: stream_id.to_string(),
                stream_name: String::new(),
                stream_desc: channel_name.to_string(),
                epg: Vec::new(),
            },
        }
    }
}

/// Three-day guide of one channel, ready for the XMLTV writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEpg {
    pub id: String,
    pub display_name: String,
    pub entries: Vec<EpgEntry>,
}

/// An entry with its derived stop time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Programme<'a> {
    pub entry: &'a EpgEntry,
    pub start_ts: i64,
    pub stop_ts: i64,
}

impl ChannelEpg {
    /// Entries in window order, each ending where the next one starts
    ///
    /// The provider sends no durations. The last entry of the window has
    /// nothing after it and ends at its own start.
    pub fn programmes(&self) -> impl Iterator<Item = Programme<'_>> + '_ {
        self.entries.iter().enumerate().map(move |(index, entry)| {
            let stop_ts = self
                .entries
                .get(index + 1)
                .map_or(entry.start_ts, |next| next.start_ts);
            Programme {
                entry,
                start_ts: entry.start_ts,
                stop_ts,
            }
        })
    }
}
