use axum::{
    routing::{get, post},
    Router,
};

use crate::{controllers::rating_controller::RatingController, AppState};

pub struct RatingRoutes;

impl RatingRoutes {
    pub fn routes() -> Router<AppState> {
        Router::new()
            .route("/song", post(RatingController::rate_song))
            .route("/{song_id}", get(RatingController::get_rating))
    }
}
