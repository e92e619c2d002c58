use crate::{helpers::thing_helpers::create_song_thing, models::song::Song, Error, Result};
use surrealdb::{engine::any::Any, Surreal};

pub async fn find_song(db: &Surreal<Any>, song_id: &str) -> Result<Option<Song>> {
    let song_thing = create_song_thing(song_id);
    let sql_query = "SELECT * FROM $song_id;";
    let mut response = db.query(sql_query).bind(("song_id", song_thing)).await?;
    let song: Option<Song> = response.take(0)?;
    Ok(song)
}

pub async fn get_song(db: &Surreal<Any>, song_id: &str) -> Result<Song> {
    find_song(db, song_id).await?.ok_or_else(|| Error::SongNotFound {
        id: song_id.to_string(),
    })
}
