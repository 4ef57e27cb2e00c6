// Render events - serializable form of every renderer adapter call
use serde::Serialize;

/// Numeric channel handle handed out by the event-based renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RenderHandle(pub u32);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderEvent {
    ChannelCreated {
        handle: RenderHandle,
        name: String,
        color: String,
    },
    PointsAppended {
        handle: RenderHandle,
        xs: Vec<f64>,
        ys: Vec<f64>,
    },
    VisibilityChanged {
        handle: RenderHandle,
        visible: bool,
    },
    VisibleRangeX {
        min: f64,
        max: f64,
    },
    VisibleRangeY {
        min: f64,
        max: f64,
    },
    ChannelCleared {
        handle: RenderHandle,
    },
    Disposed,
}

impl RenderEvent {
    pub fn is_range_update(&self) -> bool {
        matches!(
            self,
            RenderEvent::VisibleRangeX { .. } | RenderEvent::VisibleRangeY { .. }
        )
    }
}

/// Hands out sequential handles, shared by the event-based renderers.
#[derive(Debug, Default)]
pub struct HandleAllocator {
    next: u32,
}

impl HandleAllocator {
    pub fn allocate(&mut self) -> RenderHandle {
        let handle = RenderHandle(self.next);
        self.next += 1;
        handle
    }
}
