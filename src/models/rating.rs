use serde::{Deserialize, Serialize};
use surrealdb::sql::{Datetime, Thing};

use crate::helpers::thing_helpers::thing_key;

#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, strum_macros::AsRefStr,
)]
pub enum RatingType {
    #[default]
    #[serde(rename = "SONG")]
    #[strum(serialize = "SONG")]
    Song,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Rating {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,

    pub user: Thing,
    pub song: Thing,
    #[serde(rename = "type")]
    pub rating_type: RatingType,
    /// 1 to 5 stars
    pub rating: u8,
    pub comment: Option<String>,

    pub created_at: Datetime,
    pub updated_at: Datetime,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UpsertRatingRequest {
    pub song_id: String,
    #[serde(default)]
    pub song_duration: f64,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub liked: bool,
    #[serde(default, rename = "type")]
    pub rating_type: RatingType,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RatingView {
    pub id: Option<String>,
    pub user: String,
    pub song: String,
    #[serde(rename = "type")]
    pub rating_type: RatingType,
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Rating> for RatingView {
    fn from(rating: Rating) -> Self {
        Self {
            id: rating.id.as_ref().map(thing_key),
            user: thing_key(&rating.user),
            song: thing_key(&rating.song),
            rating_type: rating.rating_type,
            rating: rating.rating,
            comment: rating.comment,
            created_at: rating.created_at.0,
            updated_at: rating.updated_at.0,
        }
    }
}
