use serde::{Deserialize, Serialize};
use surrealdb::sql::{Datetime, Thing};

use crate::helpers::thing_helpers::thing_key;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, strum_macros::AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlaybackState {
    Playing,
    Completed,
}

/// One play event. Rows in `playback` are live, rows in `history` are
/// archived copies with the same shape.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaybackRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,

    pub user: Thing,
    pub song: Thing,
    pub artist: Thing,
    /// Seconds actually listened
    pub duration: f64,
    pub state: PlaybackState,
    pub created_at: Datetime,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RecordPlaybackRequest {
    pub song_id: String,
    pub duration: f64,
    pub state: PlaybackState,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackRecordView {
    pub id: Option<String>,
    pub user: String,
    pub song: String,
    pub artist: String,
    pub duration: f64,
    pub state: PlaybackState,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<PlaybackRecord> for PlaybackRecordView {
    fn from(record: PlaybackRecord) -> Self {
        Self {
            id: record.id.as_ref().map(thing_key),
            user: thing_key(&record.user),
            song: thing_key(&record.song),
            artist: thing_key(&record.artist),
            duration: record.duration,
            state: record.state,
            created_at: record.created_at.0,
        }
    }
}

/// Payload handed to the stats tracker after a play has been persisted
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackEvent {
    pub user_id: String,
    pub song_id: String,
    pub artist_id: String,
    pub duration: f64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Per-source aggregate: all matching rows folded into one bucket
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackBucket {
    pub count: u64,
    pub total_duration: f64,
    pub durations: Vec<f64>,
}

#[derive(Debug, Serialize, Clone, Copy, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackStats {
    pub total_count: u64,
    pub total_duration: f64,
    pub weighted_avg_duration: f64,
}
