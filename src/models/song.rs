use serde::{Deserialize, Serialize};
use surrealdb::sql::{Datetime, Thing};

use crate::helpers::thing_helpers::thing_key;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct SongActivities {
    #[serde(default)]
    pub total_playback_count: u64,
    #[serde(default)]
    pub total_playback_duration: f64,
    #[serde(default)]
    pub weighted_average_playback_duration: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Song {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,

    pub title: String,
    pub artist: Thing,
    /// Track length in seconds
    pub duration: f64,

    #[serde(default)]
    pub activities: SongActivities,

    // Relations
    #[serde(default)]
    pub ratings: Vec<Thing>,
    #[serde(default)]
    pub favorites: Vec<Thing>,
    #[serde(default)]
    pub playlist_for: Vec<Thing>,

    pub created_at: Datetime,
}

/// Song as returned to clients, ids flattened to their keys
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SongView {
    pub id: Option<String>,
    pub title: String,
    pub artist: String,
    pub duration: f64,
    pub activities: SongActivitiesView,
    pub ratings: Vec<String>,
    pub favorites: Vec<String>,
    pub playlist_for: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SongActivitiesView {
    pub total_playback_count: u64,
    pub total_playback_duration: f64,
    pub weighted_average_playback_duration: f64,
}

impl From<Song> for SongView {
    fn from(song: Song) -> Self {
        Self {
            id: song.id.as_ref().map(thing_key),
            title: song.title,
            artist: thing_key(&song.artist),
            duration: song.duration,
            activities: SongActivitiesView {
                total_playback_count: song.activities.total_playback_count,
                total_playback_duration: song.activities.total_playback_duration,
                weighted_average_playback_duration: song
                    .activities
                    .weighted_average_playback_duration,
            },
            ratings: song.ratings.iter().map(thing_key).collect(),
            favorites: song.favorites.iter().map(thing_key).collect(),
            playlist_for: song.playlist_for.iter().map(thing_key).collect(),
            created_at: song.created_at.0,
        }
    }
}
