// Presentation layer - HTTP command surface and render stream
pub mod app_state;
pub mod handlers;
