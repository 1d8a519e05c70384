use serde::{Deserialize, Serialize};

use super::PaginationMeta;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub track_id: String,
    pub track_title: String,
    /// Milliseconds.
    pub track_duration: i64,
    pub track_singers: String,
    pub track_file: String,
    /// Bytes.
    pub track_size: i64,
    pub track_audio_codec: String,
    pub track_audio_channels: i32,
    pub track_thumbnail: String,
    pub track_filepath: String,
    pub track_bitrate: i32,
    pub parent_title: String,
    #[serde(default)]
    pub track_order: i32,
}

impl Track {
    pub fn id(&self) -> &str {
        &self.track_id
    }
}

/// `/tracks` list response. Carries the full rating-key list of the
/// collection alongside the current page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracksResponse {
    pub tracks: Vec<Track>,
    #[serde(default)]
    pub tracks_rating_key_list: Vec<String>,
    pub pagination: PaginationMeta,
}
