pub mod playback_routes;
pub mod rating_routes;
