use serde::Serialize;
use surrealdb::{engine::any::Any, Surreal};

use crate::{
    config::StatsConfig,
    error::{Error, Result},
    helpers::{
        song_helpers::get_song,
        thing_helpers::{
            create_rating_thing, create_song_thing, create_user_thing, validate_object_id,
        },
    },
    models::{
        database_helpers::CountResult,
        rating::{Rating, RatingType, UpsertRatingRequest},
        song::{Song, SongView},
    },
    services::playlist_service::PlaylistService,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingPrompt {
    pub should_prompt: bool,
    pub song: SongView,
}

pub struct RatingService;

impl RatingService {
    /// Creates or updates the caller's rating of a song, then links it on the
    /// song. A liked song also lands in the user's default playlist.
    pub async fn upsert_rating(
        db: &Surreal<Any>,
        user_id: &str,
        request: UpsertRatingRequest,
    ) -> Result<Song> {
        let user_key = validate_object_id(user_id)?;
        let song_key = validate_object_id(&request.song_id)?;

        if !(1..=5).contains(&request.rating) {
            return Err(Error::InvalidInput {
                reason: format!("rating must be between 1 and 5, got {}", request.rating),
            });
        }
        if !request.song_duration.is_finite() || request.song_duration < 0.0 {
            return Err(Error::InvalidInput {
                reason: "songDuration must be a non-negative number".to_string(),
            });
        }

        get_song(db, song_key).await?;

        let rating_thing =
            create_rating_thing(user_key, song_key, request.rating_type.as_ref());

        // One record per (user, song, type): the key itself is the lookup.
        let upsert_sql = r#"
            UPSERT $rating SET
                user = $user,
                song = $song,
                `type` = $type,
                rating = $value,
                comment = $comment,
                created_at = created_at OR time::now(),
                updated_at = time::now()
            RETURN AFTER;
        "#;

        let mut response = db
            .query(upsert_sql)
            .bind(("rating", rating_thing))
            .bind(("user", create_user_thing(user_key)))
            .bind(("song", create_song_thing(song_key)))
            .bind(("type", request.rating_type))
            .bind(("value", request.rating))
            .bind(("comment", request.comment))
            .await?;

        let rating: Option<Rating> = response.take(0)?;
        let rating = rating.ok_or(Error::RatingUpsertFail)?;
        let rating_id = rating.id.ok_or(Error::RatingUpsertFail)?;

        tracing::debug!(
            user = user_key,
            song = song_key,
            rating = rating.rating,
            "Rating upserted"
        );

        let mut assignments = vec!["ratings = array::add(ratings OR [], $rating)"];

        let playlist_thing = if request.liked {
            let playlist = PlaylistService::add_to_default_playlist(
                db,
                user_key,
                song_key,
                request.song_duration,
            )
            .await?;
            assignments.push("favorites = array::add(favorites OR [], $user)");
            assignments.push("playlist_for = array::add(playlist_for OR [], $playlist)");
            playlist.id
        } else {
            None
        };

        let song_sql = format!("UPDATE $song SET {} RETURN AFTER;", assignments.join(", "));

        let mut response = db
            .query(song_sql)
            .bind(("song", create_song_thing(song_key)))
            .bind(("rating", rating_id))
            .bind(("user", create_user_thing(user_key)))
            .bind(("playlist", playlist_thing))
            .await?;

        let song: Option<Song> = response.take(0)?;
        song.ok_or_else(|| Error::SongNotFound {
            id: song_key.to_string(),
        })
    }

    pub async fn get_rating(
        db: &Surreal<Any>,
        user_id: &str,
        song_id: &str,
        rating_type: RatingType,
    ) -> Result<Option<Rating>> {
        let user_key = validate_object_id(user_id)?;
        let song_key = validate_object_id(song_id)?;

        let ratings: Vec<Rating> = db
            .query("SELECT * FROM rating WHERE user = $user AND song = $song AND `type` = $type LIMIT 1")
            .bind(("user", create_user_thing(user_key)))
            .bind(("song", create_song_thing(song_key)))
            .bind(("type", rating_type))
            .await?
            .take(0)?;

        Ok(ratings.into_iter().next())
    }

    /// Asks for a rating at the configured play counts, never once the user
    /// has rated the song.
    pub async fn should_prompt_rating(
        db: &Surreal<Any>,
        config: &StatsConfig,
        user_id: &str,
        song_id: &str,
    ) -> Result<RatingPrompt> {
        let user_key = validate_object_id(user_id)?;
        let song_key = validate_object_id(song_id)?;

        let song = get_song(db, song_key).await?;

        if Self::get_rating(db, user_key, song_key, RatingType::Song)
            .await?
            .is_some()
        {
            return Ok(RatingPrompt {
                should_prompt: false,
                song: song.into(),
            });
        }

        let count_sql = r#"
            SELECT count() AS total FROM playback
            WHERE user = $user AND song = $song AND duration >= $min_duration
            GROUP ALL
        "#;

        let mut response = db
            .query(count_sql)
            .bind(("user", create_user_thing(user_key)))
            .bind(("song", create_song_thing(song_key)))
            .bind(("min_duration", config.playback_min_duration_secs))
            .await?;
        let count_result: Option<CountResult> = response.take(0)?;
        let plays = count_result.map(|r| r.total).unwrap_or(0);

        Ok(RatingPrompt {
            should_prompt: config.should_prompt_at(plays),
            song: song.into(),
        })
    }
}
