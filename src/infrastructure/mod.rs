// Infrastructure layer - configuration, signal source and renderer backends
pub mod broadcast_renderer;
pub mod chunked_json;
pub mod config;
pub mod recording_renderer;
pub mod render_event;
pub mod sine_source;
