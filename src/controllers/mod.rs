pub mod playback_controller;
pub mod rating_controller;
