use async_trait::async_trait;
use surrealdb::{engine::any::Any, Surreal};

use crate::{
    error::Result,
    models::playback::PlaybackEvent,
    services::{song_service::SongService, user_service::UserService},
};

/// Called once after every persisted play
#[async_trait]
pub trait StatsTracker: Send + Sync {
    async fn track_playback(&self, event: &PlaybackEvent) -> Result<()>;
}

/// Refreshes the song aggregates, then the listener's totals
pub struct SongStatsTracker {
    db: Surreal<Any>,
}

impl SongStatsTracker {
    pub fn new(db: Surreal<Any>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StatsTracker for SongStatsTracker {
    async fn track_playback(&self, event: &PlaybackEvent) -> Result<()> {
        SongService::refresh_song_stats(&self.db, &event.song_id).await?;
        UserService::record_listen(&self.db, &event.user_id, event.duration).await?;
        Ok(())
    }
}
