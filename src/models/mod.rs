pub mod playback;
pub mod playlist;
pub mod rating;
pub mod song;
pub mod user;

pub mod database_helpers;
