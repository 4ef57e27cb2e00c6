// Broadcast renderer - fans render events out to connected stream clients
use crate::application::renderer::RendererAdapter;
use crate::infrastructure::render_event::{HandleAllocator, RenderEvent, RenderHandle};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

const EVENT_BUFFER: usize = 1024;

#[derive(Debug, Clone)]
struct KnownChannel {
    handle: RenderHandle,
    name: String,
    color: String,
    visible: bool,
}

/// What a client that connects late needs before the live events make sense.
#[derive(Debug, Default)]
struct FeedState {
    channels: Vec<KnownChannel>,
    range_x: Option<(f64, f64)>,
    range_y: Option<(f64, f64)>,
    disposed: bool,
}

impl FeedState {
    fn apply(&mut self, event: &RenderEvent) {
        match event {
            RenderEvent::ChannelCreated {
                handle,
                name,
                color,
            } => self.channels.push(KnownChannel {
                handle: *handle,
                name: name.clone(),
                color: color.clone(),
                visible: true,
            }),
            RenderEvent::VisibilityChanged { handle, visible } => {
                if let Some(channel) = self.channels.iter_mut().find(|c| c.handle == *handle) {
                    channel.visible = *visible;
                }
            }
            RenderEvent::VisibleRangeX { min, max } => self.range_x = Some((*min, *max)),
            RenderEvent::VisibleRangeY { min, max } => self.range_y = Some((*min, *max)),
            RenderEvent::Disposed => self.disposed = true,
            RenderEvent::PointsAppended { .. } | RenderEvent::ChannelCleared { .. } => {}
        }
    }

    fn replay(&self) -> Vec<RenderEvent> {
        let mut events = Vec::with_capacity(self.channels.len() * 2 + 3);
        for channel in &self.channels {
            events.push(RenderEvent::ChannelCreated {
                handle: channel.handle,
                name: channel.name.clone(),
                color: channel.color.clone(),
            });
            events.push(RenderEvent::VisibilityChanged {
                handle: channel.handle,
                visible: channel.visible,
            });
        }
        if let Some((min, max)) = self.range_x {
            events.push(RenderEvent::VisibleRangeX { min, max });
        }
        if let Some((min, max)) = self.range_y {
            events.push(RenderEvent::VisibleRangeY { min, max });
        }
        if self.disposed {
            events.push(RenderEvent::Disposed);
        }
        events
    }
}

/// Subscription side of a [`BroadcastRenderer`], shared with the HTTP layer.
#[derive(Debug, Clone)]
pub struct RenderFeed {
    events: broadcast::Sender<RenderEvent>,
    state: Arc<Mutex<FeedState>>,
}

impl RenderFeed {
    fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            events,
            state: Arc::new(Mutex::new(FeedState::default())),
        }
    }

    /// Subscribe to live events. The returned replay describes the current
    /// channels, visibility and visible range, and no live event is lost or
    /// duplicated between the replay and the receiver.
    pub fn subscribe(&self) -> (Vec<RenderEvent>, broadcast::Receiver<RenderEvent>) {
        let state = self.lock();
        (state.replay(), self.events.subscribe())
    }

    fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    fn publish(&self, event: RenderEvent) {
        let mut state = self.lock();
        state.apply(&event);
        // No subscribers is fine; nobody is watching yet
        let _ = self.events.send(event);
    }

    fn lock(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct BroadcastRenderer {
    handles: HandleAllocator,
    feed: RenderFeed,
}

impl Default for BroadcastRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl BroadcastRenderer {
    pub fn new() -> Self {
        Self {
            handles: HandleAllocator::default(),
            feed: RenderFeed::new(),
        }
    }

    /// Feed used to subscribe new clients after the renderer has been
    /// handed to the controller.
    pub fn feed(&self) -> RenderFeed {
        self.feed.clone()
    }
}

impl RendererAdapter for BroadcastRenderer {
    type Handle = RenderHandle;

    fn create_channel(&mut self, name: &str, color: &str) -> RenderHandle {
        let handle = self.handles.allocate();
        tracing::debug!(handle = handle.0, name, color, "Channel created");
        self.feed.publish(RenderEvent::ChannelCreated {
            handle,
            name: name.to_string(),
            color: color.to_string(),
        });
        handle
    }

    fn append_points(&mut self, handle: &RenderHandle, xs: &[f64], ys: &[f64]) {
        self.feed.publish(RenderEvent::PointsAppended {
            handle: *handle,
            xs: xs.to_vec(),
            ys: ys.to_vec(),
        });
    }

    fn set_visible(&mut self, handle: &RenderHandle, visible: bool) {
        self.feed.publish(RenderEvent::VisibilityChanged {
            handle: *handle,
            visible,
        });
    }

    fn set_visible_range_x(&mut self, min: f64, max: f64) {
        self.feed.publish(RenderEvent::VisibleRangeX { min, max });
    }

    fn set_visible_range_y(&mut self, min: f64, max: f64) {
        self.feed.publish(RenderEvent::VisibleRangeY { min, max });
    }

    fn clear_channel(&mut self, handle: &RenderHandle) {
        self.feed.publish(RenderEvent::ChannelCleared { handle: *handle });
    }

    fn dispose(&mut self) {
        tracing::debug!(subscribers = self.feed.subscriber_count(), "Renderer disposed");
        self.feed.publish(RenderEvent::Disposed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribers_receive_events_in_order() {
        let mut renderer = BroadcastRenderer::new();
        let (replay, mut rx) = renderer.feed().subscribe();
        assert!(replay.is_empty());

        let handle = renderer.create_channel("Temperature", "#03A9F4");
        renderer.append_points(&handle, &[0.0], &[80.0]);
        renderer.set_visible_range_y(79.0, 81.0);

        assert!(matches!(
            rx.try_recv().unwrap(),
            RenderEvent::ChannelCreated { handle: RenderHandle(0), .. }
        ));
        assert_eq!(
            rx.try_recv().unwrap(),
            RenderEvent::PointsAppended {
                handle,
                xs: vec![0.0],
                ys: vec![80.0]
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            RenderEvent::VisibleRangeY { min: 79.0, max: 81.0 }
        );
    }

    #[test]
    fn test_late_subscriber_gets_current_state() {
        let mut renderer = BroadcastRenderer::new();
        let pressure = renderer.create_channel("Pressure", "#1a237e");
        let temperature = renderer.create_channel("Temperature", "#03A9F4");
        renderer.set_visible(&temperature, false);
        renderer.append_points(&pressure, &[0.0, 0.1], &[60.0, 61.0]);
        renderer.set_visible_range_x(0.0, 0.1);
        renderer.set_visible_range_y(55.0, 66.0);
        // A later frozen window replaces the earlier one
        renderer.set_visible_range_x(0.02, 0.08);

        let (replay, mut rx) = renderer.feed().subscribe();
        assert_eq!(
            replay,
            vec![
                RenderEvent::ChannelCreated {
                    handle: pressure,
                    name: "Pressure".to_string(),
                    color: "#1a237e".to_string(),
                },
                RenderEvent::VisibilityChanged {
                    handle: pressure,
                    visible: true,
                },
                RenderEvent::ChannelCreated {
                    handle: temperature,
                    name: "Temperature".to_string(),
                    color: "#03A9F4".to_string(),
                },
                RenderEvent::VisibilityChanged {
                    handle: temperature,
                    visible: false,
                },
                RenderEvent::VisibleRangeX { min: 0.02, max: 0.08 },
                RenderEvent::VisibleRangeY { min: 55.0, max: 66.0 },
            ]
        );
        // Nothing published before the subscription is delivered twice
        assert!(rx.try_recv().is_err());

        renderer.clear_channel(&pressure);
        assert_eq!(
            rx.try_recv().unwrap(),
            RenderEvent::ChannelCleared { handle: pressure }
        );
    }

    #[test]
    fn test_publishing_without_subscribers_is_harmless() {
        let mut renderer = BroadcastRenderer::new();
        let handle = renderer.create_channel("Pressure", "#1a237e");
        renderer.clear_channel(&handle);
        renderer.dispose();

        let (replay, mut late) = renderer.feed().subscribe();
        assert_eq!(replay.last(), Some(&RenderEvent::Disposed));
        assert!(late.try_recv().is_err());
    }
}
