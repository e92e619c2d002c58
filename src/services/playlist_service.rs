use surrealdb::sql::Thing;
use surrealdb::{engine::any::Any, Surreal};

use crate::{
    helpers::thing_helpers::{
        create_playlist_thing, create_song_thing, create_user_thing, validate_object_id,
    },
    models::playlist::{Playlist, DEFAULT_PLAYLIST_NAME},
    services::user_service::UserService,
    Error,
};

pub struct PlaylistService;

impl PlaylistService {
    /// The user's "liked songs" playlist id. A user without one gets the
    /// playlist keyed by their own id, so concurrent first likes land on the
    /// same record.
    async fn default_playlist_thing(db: &Surreal<Any>, user_id: &str) -> Result<Thing, Error> {
        let user = UserService::get_user(db, user_id)
            .await?
            .ok_or_else(|| Error::UserNotFound {
                id: user_id.to_string(),
            })?;

        if let Some(playlist) = user.default_playlist {
            return Ok(playlist);
        }

        let existing = Self::get_default_playlist(db, user_id)
            .await?
            .and_then(|playlist| playlist.id);

        Ok(existing.unwrap_or_else(|| create_playlist_thing(user_id)))
    }

    /// Adds a song to the user's default playlist, creating the playlist on
    /// first use. Stats only move when the song was not already in it.
    pub async fn add_to_default_playlist(
        db: &Surreal<Any>,
        user_id: &str,
        song_id: &str,
        song_duration: f64,
    ) -> Result<Playlist, Error> {
        let user_key = validate_object_id(user_id)?;
        let song_key = validate_object_id(song_id)?;

        let playlist_thing = Self::default_playlist_thing(db, user_key).await?;

        // Stats are assigned before `songs` so they still see the old list.
        let query = r#"
            UPSERT $playlist SET
                user = $user,
                name = name OR $name,
                is_default = true,
                total_song_count = (total_song_count OR 0)
                    + (IF (songs OR []) CONTAINS $song THEN 0 ELSE 1 END),
                total_song_duration = (total_song_duration OR 0)
                    + (IF (songs OR []) CONTAINS $song THEN 0 ELSE $duration END),
                songs = array::add(songs OR [], $song),
                created_at = created_at OR time::now(),
                updated_at = time::now()
            RETURN AFTER;
            UPDATE $user SET default_playlist = $playlist;
        "#;

        let mut response = db
            .query(query)
            .bind(("playlist", playlist_thing))
            .bind(("user", create_user_thing(user_key)))
            .bind(("song", create_song_thing(song_key)))
            .bind(("name", DEFAULT_PLAYLIST_NAME.to_string()))
            .bind(("duration", song_duration))
            .await
            .map_err(|e| {
                Error::DbError(format!(
                    "Failed to add song '{}' to default playlist: {}",
                    song_key, e
                ))
            })?;

        let playlist: Option<Playlist> = response.take(0)?;
        let playlist = playlist.ok_or_else(|| {
            Error::DbError(format!(
                "Default playlist of user '{}' could not be written",
                user_key
            ))
        })?;

        tracing::debug!(
            user = user_key,
            song = song_key,
            songs = playlist.total_song_count,
            "Song liked into default playlist"
        );

        Ok(playlist)
    }

    pub async fn get_default_playlist(
        db: &Surreal<Any>,
        user_id: &str,
    ) -> Result<Option<Playlist>, Error> {
        let playlists: Vec<Playlist> = db
            .query("SELECT * FROM playlist WHERE user = $user AND is_default = true LIMIT 1")
            .bind(("user", create_user_thing(user_id)))
            .await?
            .take(0)?;

        Ok(playlists.into_iter().next())
    }
}
