// Application state for HTTP handlers
use crate::application::streaming_service::StreamingService;
use crate::infrastructure::broadcast_renderer::RenderFeed;

#[derive(Clone)]
pub struct AppState {
    pub streaming_service: StreamingService,
    pub render_feed: RenderFeed,
}
