pub mod playback_service;
pub mod playlist_service;
pub mod rating_service;
pub mod song_service;
pub mod stats_tracker;
pub mod user_service;
