use serde::{Deserialize, Serialize};

use super::Track;

/// Album summary as listed by `/albums`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Album {
    pub album_artist: String,
    pub album_title: String,
    pub album_year: i32,
    pub album_rating_key: String,
    pub album_thumbnail: String,
    #[serde(default)]
    pub album_composer: String,
}

impl Album {
    pub fn id(&self) -> &str {
        &self.album_rating_key
    }
}

/// `/albums/album/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumDetail {
    pub album_rating_key: String,
    pub album_artist: String,
    pub album_title: String,
    pub album_thumbnail: String,
    pub album_year: i32,
    #[serde(default)]
    pub album_composer: String,
    #[serde(default)]
    pub album_tracks: Vec<Track>,
}

impl AlbumDetail {
    pub fn summary(&self) -> Album {
        Album {
            album_artist: self.album_artist.clone(),
            album_title: self.album_title.clone(),
            album_year: self.album_year,
            album_rating_key: self.album_rating_key.clone(),
            album_thumbnail: self.album_thumbnail.clone(),
            album_composer: self.album_composer.clone(),
        }
    }
}
