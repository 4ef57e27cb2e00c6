// In-memory renderer - records every call for inspection
use crate::application::renderer::RendererAdapter;
use crate::domain::viewport::AxisRange;
use crate::infrastructure::render_event::{HandleAllocator, RenderEvent, RenderHandle};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
pub struct RecordingRenderer {
    handles: HandleAllocator,
    log: RenderLog,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle onto the recorded events that stays readable after the
    /// renderer has been moved into a controller.
    pub fn log(&self) -> RenderLog {
        self.log.clone()
    }

    fn record(&self, event: RenderEvent) {
        self.log.lock().push(event);
    }
}

impl RendererAdapter for RecordingRenderer {
    type Handle = RenderHandle;

    fn create_channel(&mut self, name: &str, color: &str) -> RenderHandle {
        let handle = self.handles.allocate();
        self.record(RenderEvent::ChannelCreated {
            handle,
            name: name.to_string(),
            color: color.to_string(),
        });
        handle
    }

    fn append_points(&mut self, handle: &RenderHandle, xs: &[f64], ys: &[f64]) {
        self.record(RenderEvent::PointsAppended {
            handle: *handle,
            xs: xs.to_vec(),
            ys: ys.to_vec(),
        });
    }

    fn set_visible(&mut self, handle: &RenderHandle, visible: bool) {
        self.record(RenderEvent::VisibilityChanged {
            handle: *handle,
            visible,
        });
    }

    fn set_visible_range_x(&mut self, min: f64, max: f64) {
        self.record(RenderEvent::VisibleRangeX { min, max });
    }

    fn set_visible_range_y(&mut self, min: f64, max: f64) {
        self.record(RenderEvent::VisibleRangeY { min, max });
    }

    fn clear_channel(&mut self, handle: &RenderHandle) {
        self.record(RenderEvent::ChannelCleared { handle: *handle });
    }

    fn dispose(&mut self) {
        self.record(RenderEvent::Disposed);
    }
}

#[derive(Debug, Clone, Default)]
pub struct RenderLog {
    events: Arc<Mutex<Vec<RenderEvent>>>,
}

impl RenderLog {
    pub fn events(&self) -> Vec<RenderEvent> {
        self.lock().clone()
    }

    /// Number of range pushes (X and Y counted separately).
    pub fn range_updates(&self) -> usize {
        self.lock().iter().filter(|e| e.is_range_update()).count()
    }

    pub fn last_range_x(&self) -> Option<AxisRange> {
        self.lock().iter().rev().find_map(|e| match e {
            RenderEvent::VisibleRangeX { min, max } => Some(AxisRange::new(*min, *max)),
            _ => None,
        })
    }

    pub fn last_range_y(&self) -> Option<AxisRange> {
        self.lock().iter().rev().find_map(|e| match e {
            RenderEvent::VisibleRangeY { min, max } => Some(AxisRange::new(*min, *max)),
            _ => None,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RenderEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
