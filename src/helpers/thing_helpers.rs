use lazy_regex::regex_is_match;
use surrealdb::sql::Thing;

use crate::{Error, Result};

/// Parse an id that may come in as `tb:id` or as the bare key
pub fn parse_id_part(id: &str) -> &str {
    match id.split_once(':') {
        Some((_, id_part)) => id_part,
        None => id,
    }
}

/// True for 24 hex characters, the only key shape the store hands out
pub fn is_valid_object_id(id: &str) -> bool {
    regex_is_match!(r"^[0-9a-fA-F]{24}$", id)
}

/// Accepts only a bare key, no table prefix and no surrounding whitespace
pub fn validate_object_id(id: &str) -> Result<&str> {
    if is_valid_object_id(id) {
        Ok(id)
    } else {
        Err(Error::InvalidObjectId { id: id.to_string() })
    }
}

/// New key: 4 bytes of unix seconds followed by 8 random bytes
pub fn generate_object_id() -> String {
    let seconds = chrono::Utc::now().timestamp() as u32;
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("{:08x}{}", seconds, &random[..16])
}

/// Bare key of a record id, without the table name
pub fn thing_key(thing: &Thing) -> String {
    thing.id.to_raw()
}

fn create_thing(table: &str, id: &str) -> Thing {
    let clean_id = parse_id_part(id);
    Thing::from((table.to_string(), clean_id.to_string()))
}

pub fn create_user_thing(user_id: &str) -> Thing {
    create_thing("user", user_id)
}

pub fn create_song_thing(song_id: &str) -> Thing {
    create_thing("song", song_id)
}

pub fn create_playlist_thing(playlist_id: &str) -> Thing {
    create_thing("playlist", playlist_id)
}

/// Ratings are keyed by their owner, song and kind so that one upsert target
/// exists per combination.
pub fn create_rating_thing(user_id: &str, song_id: &str, rating_type: &str) -> Thing {
    let key = format!(
        "{}_{}_{}",
        parse_id_part(user_id),
        parse_id_part(song_id),
        rating_type.to_lowercase()
    );
    Thing::from(("rating".to_string(), key))
}
