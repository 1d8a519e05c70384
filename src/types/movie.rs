use serde::{Deserialize, Serialize};

use super::{null_as_default, Track};

/// Movie summary as listed by `/movies`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Movie {
    pub movie_rating_key: String,
    pub movie_title: String,
    #[serde(default)]
    pub movie_year: Option<i32>,
    #[serde(default)]
    pub movie_thumbnail: Option<String>,
}

impl Movie {
    pub fn id(&self) -> &str {
        &self.movie_rating_key
    }
}

/// `/movies/movie/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetail {
    pub movie_rating_key: String,
    pub movie_title: String,
    #[serde(default)]
    pub movie_studio: Option<String>,
    #[serde(default)]
    pub movie_original_title: Option<String>,
    #[serde(default)]
    pub movie_content_rating: Option<String>,
    #[serde(default)]
    pub movie_summary: Option<String>,
    #[serde(default)]
    pub movie_audience_rating: Option<f64>,
    #[serde(default)]
    pub movie_year: Option<i32>,
    #[serde(default)]
    pub movie_thumbnail: Option<String>,
    #[serde(default)]
    pub movie_art: Option<String>,
    /// Milliseconds.
    pub movie_duration: i64,
    #[serde(default)]
    pub movie_originally_available_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub media: Vec<Media>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genre: Vec<Genre>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub country: Vec<Country>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub director: Vec<Credit>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub writer: Vec<Credit>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub producer: Vec<Credit>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating: Vec<Rating>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub actor: Vec<Actor>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub media_id: i64,
    pub media_duration: i64,
    pub media_bit_rate: i64,
    pub media_width: i32,
    pub media_height: i32,
    pub media_aspect_ratio: f64,
    pub media_audio_channels: i32,
    pub media_audio_codec: String,
    pub media_video_codec: String,
    pub media_container: String,
    pub media_video_resolution: String,
    pub media_video_frame_rate: String,
    #[serde(default)]
    pub media_video_profile: String,
    #[serde(default)]
    pub part: Vec<MediaPart>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaPart {
    pub part_id: i64,
    pub part_file: String,
    pub part_key: String,
    pub part_size: i64,
    pub part_container: String,
    #[serde(default)]
    pub stream: Vec<MediaStream>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaStream {
    pub stream_id: i64,
    #[serde(default)]
    pub stream_type: Option<i32>,
    pub stream_codec: String,
    pub stream_display_title: String,
    #[serde(default)]
    pub stream_extended_display_title: String,
    #[serde(default)]
    pub stream_audio_channel_layout: Option<String>,
    #[serde(default)]
    pub stream_channels: Option<i32>,
    #[serde(default)]
    pub stream_sampling_rate: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub genre_id: i64,
    pub genre: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub country_id: i64,
    pub country: String,
}

/// Director, writer or producer entry. The backend prefixes each field with
/// the role name (`director_id`, `writer_name`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credit {
    #[serde(alias = "director_id", alias = "writer_id", alias = "producer_id")]
    pub id: i64,
    #[serde(alias = "director_name", alias = "writer_name", alias = "producer_name")]
    pub name: String,
    #[serde(
        default,
        alias = "director_thumb",
        alias = "writer_thumb",
        alias = "producer_thumb"
    )]
    pub thumb: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub actor_id: i64,
    pub actor_name: String,
    #[serde(default)]
    pub actor_role: String,
    #[serde(default)]
    pub actor_thumb: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub rating_image: String,
    pub rating_value: i32,
    pub rating_type: String,
}
