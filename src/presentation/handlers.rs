// HTTP request handlers - command surface for the UI layer
use crate::application::controller::CommandOutcome;
use crate::application::streaming_service::ServiceError;
use crate::domain::error::ControllerError;
use crate::domain::viewport::Axis;
use crate::infrastructure::chunked_json::stream_from_broadcast;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct PercentBody {
    pub percent: f64,
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub outcome: CommandOutcome,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/view", get(view_snapshot))
        .route("/stream", get(stream_render_events))
        .route("/signals/:id/toggle", post(toggle_signal))
        .route("/view/x-zoom", put(set_x_zoom))
        .route("/view/y-zoom", put(set_y_zoom))
        .route("/view/x-position", put(set_x_position))
        .route("/view/y-position", put(set_y_position))
        .route("/view/reset", post(reset_view))
        .route("/data/clear", post(clear_data))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current viewport, statistics and channel summary
pub async fn view_snapshot(State(state): State<Arc<AppState>>) -> Response {
    match state.streaming_service.snapshot().await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => error_response(e),
    }
}

/// Live render events as newline-delimited JSON, preceded by the current
/// channels and visible range
pub async fn stream_render_events(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (replay, rx) = state.render_feed.subscribe();
    stream_from_broadcast(replay, rx).await
}

pub async fn toggle_signal(
    Path(id): Path<usize>,
    State(state): State<Arc<AppState>>,
) -> Response {
    command_response(state.streaming_service.toggle_signal(id).await)
}

pub async fn set_x_zoom(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PercentBody>,
) -> Response {
    command_response(state.streaming_service.set_zoom(Axis::X, body.percent).await)
}

pub async fn set_y_zoom(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PercentBody>,
) -> Response {
    command_response(state.streaming_service.set_zoom(Axis::Y, body.percent).await)
}

pub async fn set_x_position(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PercentBody>,
) -> Response {
    command_response(
        state
            .streaming_service
            .set_position(Axis::X, body.percent)
            .await,
    )
}

pub async fn set_y_position(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PercentBody>,
) -> Response {
    command_response(
        state
            .streaming_service
            .set_position(Axis::Y, body.percent)
            .await,
    )
}

pub async fn reset_view(State(state): State<Arc<AppState>>) -> Response {
    command_response(state.streaming_service.reset_view().await)
}

pub async fn clear_data(State(state): State<Arc<AppState>>) -> Response {
    command_response(state.streaming_service.clear_data().await)
}

fn command_response(result: Result<CommandOutcome, ServiceError>) -> Response {
    match result {
        Ok(outcome) => Json(CommandResponse { outcome }).into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(error: ServiceError) -> Response {
    let status = match &error {
        ServiceError::Controller(
            ControllerError::InvalidZoomLevel(_) | ControllerError::InvalidPosition(_),
        ) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::Controller(ControllerError::UnknownChannel(_)) => StatusCode::NOT_FOUND,
        ServiceError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        ServiceError::Controller(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        tracing::error!("Command failed: {}", error);
    } else {
        tracing::warn!("Command rejected: {}", error);
    }

    (status, Json(json!({ "error": error.to_string() }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::streaming_service::StreamingService;
    use crate::infrastructure::broadcast_renderer::BroadcastRenderer;
    use crate::infrastructure::config::{default_channels, StreamSettings};
    use crate::infrastructure::sine_source::SineWaveSource;
    use axum::body::Body;
    use axum::http::Request;
    use futures::StreamExt;
    use std::time::Duration;
    use tower::ServiceExt;

    fn state() -> Arc<AppState> {
        let channels = default_channels();
        let renderer = BroadcastRenderer::new();
        let render_feed = renderer.feed();
        let source = Arc::new(SineWaveSource::from_channels(&channels));
        let (streaming_service, _task) =
            StreamingService::spawn(StreamSettings::default(), &channels, source, renderer)
                .unwrap();
        Arc::new(AppState {
            streaming_service,
            render_feed,
        })
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_zoom_applies_and_switches_to_manual() {
        let state = state();

        let response = set_x_zoom(State(state.clone()), Json(PercentBody { percent: 200.0 })).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "outcome": "applied" }));

        let snapshot = json_body(view_snapshot(State(state)).await).await;
        assert_eq!(snapshot["mode"], "manual");
        assert_eq!(snapshot["viewport"]["x_zoom_percent"], 200.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_zoom_is_unprocessable() {
        let state = state();
        let response = set_y_zoom(State(state), Json(PercentBody { percent: 0.0 })).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_signal_is_not_found() {
        let state = state();
        let response = toggle_signal(Path(42), State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = toggle_signal(Path(0), State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_service_is_unavailable() {
        let state = state();
        state.streaming_service.shutdown().await.unwrap();

        let response = clear_data(State(state)).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_stream_client_gets_channels_first() {
        let state = state();
        tokio::time::sleep(Duration::from_millis(10)).await;
        // Freeze the window so no range update follows the replay
        set_x_zoom(State(state.clone()), Json(PercentBody { percent: 200.0 })).await;

        let response = stream_render_events(State(state.clone()))
            .await
            .into_response();
        let mut body = response.into_body().into_data_stream();
        let mut events = Vec::new();
        for _ in 0..9 {
            let chunk = body.next().await.unwrap().unwrap();
            events.push(serde_json::from_slice::<serde_json::Value>(&chunk).unwrap());
        }

        let types: Vec<&str> = events.iter().map(|e| e["type"].as_str().unwrap()).collect();
        assert_eq!(
            types,
            vec![
                "channel_created",
                "visibility_changed",
                "channel_created",
                "visibility_changed",
                "channel_created",
                "visibility_changed",
                "visible_range_x",
                "visible_range_y",
                // First live event is the next tick
                "points_appended",
            ]
        );
        assert_eq!(events[0]["name"], "Pressure actual value [bar]");
        assert_eq!(events[4]["color"], "#03A9F4");

        let snapshot = state.streaming_service.snapshot().await.unwrap();
        let frozen = snapshot.visible_range.unwrap().x;
        assert_eq!(events[6]["min"].as_f64(), Some(frozen.min));
        assert_eq!(events[6]["max"].as_f64(), Some(frozen.max));
    }

    #[tokio::test(start_paused = true)]
    async fn test_router_paths_reach_commands() {
        let app = router(state());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/view/x-zoom")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"percent":250}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "outcome": "applied" }));

        let post = |uri: &str| {
            Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::empty())
                .unwrap()
        };
        let response = app.clone().oneshot(post("/signals/1/toggle")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let response = app.clone().oneshot(post("/signals/7/toggle")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let view = Request::builder().uri("/view").body(Body::empty()).unwrap();
        let snapshot = json_body(app.clone().oneshot(view).await.unwrap()).await;
        assert_eq!(snapshot["mode"], "manual");
        assert_eq!(snapshot["viewport"]["x_zoom_percent"], 250.0);
        assert_eq!(snapshot["channels"][1]["visible"], false);

        let response = app.clone().oneshot(post("/view/reset")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let health = Request::builder().uri("/healthz").body(Body::empty()).unwrap();
        let response = app.oneshot(health).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_check() {
        assert_eq!(health_check().await, "ok");
    }
}
