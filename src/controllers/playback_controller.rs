use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;

use crate::{
    error::Result,
    middlewares::mw_auth::Ctx,
    models::{
        playback::{PlaybackRecordView, PlaybackStats, RecordPlaybackRequest},
        song::SongView,
    },
    services::{playback_service::PlaybackService, rating_service::RatingService},
    AppState,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPlaybackResponse {
    pub playback_log: Option<PlaybackRecordView>,
    pub should_prompt: bool,
    pub song: Option<SongView>,
}

pub struct PlaybackController;

impl PlaybackController {
    pub async fn record_playback(
        State(state): State<AppState>,
        Extension(ctx): Extension<Ctx>,
        Json(payload): Json<RecordPlaybackRequest>,
    ) -> Result<Json<RecordPlaybackResponse>> {
        let song_id = payload.song_id.clone();

        let record = PlaybackService::create_playback_log(
            &state.db,
            state.stats_tracker.as_ref(),
            &ctx.user_id,
            payload,
        )
        .await?;

        let Some(record) = record else {
            return Ok(Json(RecordPlaybackResponse {
                playback_log: None,
                should_prompt: false,
                song: None,
            }));
        };

        let prompt =
            RatingService::should_prompt_rating(&state.db, &state.stats_config, &ctx.user_id, &song_id)
                .await?;

        if prompt.should_prompt {
            tracing::info!(user = %ctx.user.username, song = %song_id, "Prompting for rating");
        }

        Ok(Json(RecordPlaybackResponse {
            playback_log: Some(record.into()),
            should_prompt: prompt.should_prompt,
            song: Some(prompt.song),
        }))
    }

    pub async fn get_song_stats(
        State(state): State<AppState>,
        Path(song_id): Path<String>,
    ) -> Result<Json<PlaybackStats>> {
        let stats = PlaybackService::aggregate_playback_stats(&state.db, &song_id).await?;
        Ok(Json(stats))
    }
}
