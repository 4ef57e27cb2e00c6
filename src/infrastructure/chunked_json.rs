// Chunked JSON streaming utilities
use crate::infrastructure::render_event::RenderEvent;
use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;
use tokio::sync::broadcast;

/// Create a chunked newline-delimited JSON response
pub fn chunked_json_stream<S>(stream: S) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = RenderEvent> + Send + 'static,
{
    let byte_stream = stream.map(serialize_chunk);
    let body = Body::from_stream(byte_stream);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/x-ndjson")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Serialize a single event to one line
fn serialize_chunk(event: RenderEvent) -> Result<Bytes, std::io::Error> {
    let json = serde_json::to_vec(&event).map_err(std::io::Error::other)?;

    let mut chunk = BytesMut::with_capacity(json.len() + 1);
    chunk.put_slice(&json);
    chunk.put_u8(b'\n');

    Ok(chunk.freeze())
}

/// Helper to create a streaming response from a broadcast subscription.
/// `replay` is sent ahead of the live events. The stream ends when the
/// renderer is disposed.
pub async fn stream_from_broadcast(
    replay: Vec<RenderEvent>,
    mut rx: broadcast::Receiver<RenderEvent>,
) -> impl IntoResponse {
    let stream = async_stream::stream! {
        let mut disposed = false;
        for event in replay {
            disposed = event == RenderEvent::Disposed;
            yield event;
            if disposed {
                break;
            }
        }
        while !disposed {
            match rx.recv().await {
                Ok(event) => {
                    disposed = event == RenderEvent::Disposed;
                    yield event;
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Stream client lagging, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    match chunked_json_stream(stream) {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
