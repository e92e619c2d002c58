use axum::{
    routing::{get, post},
    Router,
};

use crate::{controllers::playback_controller::PlaybackController, AppState};

pub struct PlaybackRoutes;

impl PlaybackRoutes {
    pub fn routes() -> Router<AppState> {
        Router::new()
            .route("/record", post(PlaybackController::record_playback))
            .route("/stats/{song_id}", get(PlaybackController::get_song_stats))
    }
}
