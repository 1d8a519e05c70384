use serde::{Deserialize, Serialize};

use super::PaginationMeta;

/// Name-only listings: `/artists`, `/singers`, `/musicians`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameListResponse {
    #[serde(alias = "artists", alias = "singers", alias = "musicians")]
    pub names: Vec<String>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackId {
    pub id: i64,
    pub track_rating_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackIdsResponse {
    pub track_ids: Vec<TrackId>,
}
