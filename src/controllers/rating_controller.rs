use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::{
    error::Result,
    middlewares::mw_auth::Ctx,
    models::{
        rating::{RatingType, RatingView, UpsertRatingRequest},
        song::SongView,
    },
    services::rating_service::RatingService,
    AppState,
};

pub struct RatingController;

impl RatingController {
    /// The caller's rating of a song, `null` when there is none
    pub async fn get_rating(
        State(state): State<AppState>,
        Extension(ctx): Extension<Ctx>,
        Path(song_id): Path<String>,
    ) -> Result<Json<Option<RatingView>>> {
        let rating =
            RatingService::get_rating(&state.db, &ctx.user_id, &song_id, RatingType::Song).await?;

        Ok(Json(rating.map(RatingView::from)))
    }

    pub async fn rate_song(
        State(state): State<AppState>,
        Extension(ctx): Extension<Ctx>,
        Json(payload): Json<UpsertRatingRequest>,
    ) -> Result<Json<SongView>> {
        let song = RatingService::upsert_rating(&state.db, &ctx.user_id, payload).await?;

        Ok(Json(song.into()))
    }
}
