use bon::Builder;
use serde::{Deserialize, Serialize};

use super::{PaginationMeta, Track};

/// Body of `POST /user/playback/state/save`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackStatePayload {
    pub user_id: String,
    pub current_playing_track: String,
    /// Seconds into the current track.
    pub playback_position: f64,
    pub is_shuffle_enabled: bool,
    pub shuffled_track_context: Vec<String>,
    pub original_track_context: Vec<String>,
}

/// Player state to persist. The user id is filled in from the credential
/// store when the update is sent.
///
/// ```
/// use prasaddys::types::PlaybackUpdate;
///
/// let update = PlaybackUpdate::builder()
///     .current_playing_track("12345")
///     .is_shuffle_enabled(true)
///     .shuffled_track_context(vec!["3".into(), "1".into()])
///     .original_track_context(vec!["1".into(), "3".into()])
///     .build();
/// assert_eq!(update.playback_position, 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Builder)]
pub struct PlaybackUpdate {
    #[builder(into)]
    pub current_playing_track: String,
    #[builder(default)]
    pub playback_position: f64,
    #[builder(default)]
    pub is_shuffle_enabled: bool,
    #[builder(default)]
    pub shuffled_track_context: Vec<String>,
    #[builder(default)]
    pub original_track_context: Vec<String>,
}

impl PlaybackUpdate {
    pub fn into_payload(self, user_id: impl Into<String>) -> PlaybackStatePayload {
        PlaybackStatePayload {
            user_id: user_id.into(),
            current_playing_track: self.current_playing_track,
            playback_position: self.playback_position,
            is_shuffle_enabled: self.is_shuffle_enabled,
            shuffled_track_context: self.shuffled_track_context,
            original_track_context: self.original_track_context,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub playback_position: f64,
    pub is_shuffle_enabled: bool,
    #[serde(default)]
    pub shuffle_context: Option<Vec<String>>,
    #[serde(default)]
    pub current_playing_track: Option<String>,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

/// `GET /user/playback/state/get/{userId}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackStateResponse {
    pub playback_state: PlaybackState,
    pub pagination: PaginationMeta,
}
