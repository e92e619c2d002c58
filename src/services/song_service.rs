use crate::error::Result;
use crate::helpers::{
    number_helpers::round_to,
    thing_helpers::{create_song_thing, validate_object_id},
};
use crate::models::song::Song;
use crate::services::playback_service::PlaybackService;
use crate::Error;
use surrealdb::{engine::any::Any, Surreal};

pub struct SongService;

impl SongService {
    /// Recomputes `activities.*` from live and archived plays and stores them
    /// on the song.
    pub async fn refresh_song_stats(db: &Surreal<Any>, song_id: &str) -> Result<Song> {
        let song_key = validate_object_id(song_id)?;
        let stats = PlaybackService::aggregate_playback_stats(db, song_key).await?;

        let sql_query = r#"
            UPDATE $song SET
                activities.total_playback_count = $count,
                activities.total_playback_duration = $total_duration,
                activities.weighted_average_playback_duration = $weighted_average
            RETURN AFTER;
        "#;

        let mut response = db
            .query(sql_query)
            .bind(("song", create_song_thing(song_key)))
            .bind(("count", stats.total_count))
            .bind(("total_duration", round_to(stats.total_duration, 2)))
            .bind(("weighted_average", round_to(stats.weighted_avg_duration, 2)))
            .await?;

        let song: Option<Song> = response.take(0)?;
        let song = song.ok_or_else(|| Error::SongNotFound {
            id: song_key.to_string(),
        })?;

        tracing::debug!(
            song = song_key,
            count = stats.total_count,
            total = stats.total_duration,
            "Song stats refreshed"
        );

        Ok(song)
    }
}
