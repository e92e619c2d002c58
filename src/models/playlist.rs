use serde::{Deserialize, Serialize};
use surrealdb::sql::{Datetime, Thing};

pub const DEFAULT_PLAYLIST_NAME: &str = "Liked Songs";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Playlist {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,

    pub user: Thing,
    pub name: String,
    /// The per-user "liked songs" collection
    pub is_default: bool,
    #[serde(default)]
    pub songs: Vec<Thing>,

    // Stats
    #[serde(default)]
    pub total_song_count: u64,
    #[serde(default)]
    pub total_song_duration: f64,

    // Timestamps
    pub created_at: Datetime,
    pub updated_at: Datetime,
}
