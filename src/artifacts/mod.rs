//! On-disk artifacts consumed by the PVR client
//!
//! Two files live under the configured data directory: the playlist and the
//! XMLTV guide. Each is only ever replaced wholesale through
//! [`atomic_write::write_atomically`], so a reader sees either the previous
//! complete file or the new complete file.

pub mod atomic_write;
pub mod playlist;
pub mod staleness;
pub mod xmltv;

pub use atomic_write::{ensure_directory, temp_path_for, write_atomically};
pub use playlist::{render_playlist, write_playlist, PlaylistSummary};
pub use staleness::{check_artifact, needs_refresh, Staleness, STALE_AFTER};
pub use xmltv::{render_epg, sanitize_text, write_epg, EpgSummary};
