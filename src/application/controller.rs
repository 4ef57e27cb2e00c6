// Streaming controller - ingestion, statistics and viewport in one owner
use crate::application::renderer::RendererAdapter;
use crate::application::sample_source::SampleSource;
use crate::application::scheduler::{Tick, TickScheduler};
use crate::domain::channel::{Channel, ChannelId, DataPoint};
use crate::domain::error::ControllerError;
use crate::domain::statistics::RunningStatistics;
use crate::domain::viewport::{Axis, ViewportMode, ViewportState, VisibleRange};
use crate::infrastructure::config::{ChannelSettings, StreamSettings};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    /// Never started; commands are ignored.
    Idle,
    Streaming,
    Stopped,
    /// Renderer released; commands are ignored.
    Disposed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandOutcome {
    Applied,
    /// The controller was not streaming yet (or already disposed).
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Ingested { samples: usize },
    /// No channels configured; nothing to do this time.
    Empty,
    /// The tick belongs to a cancelled chain.
    Discarded,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelSnapshot {
    pub id: ChannelId,
    pub name: String,
    pub color: String,
    pub visible: bool,
    pub points: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ControllerSnapshot {
    pub lifecycle: Lifecycle,
    pub viewport: ViewportState,
    pub mode: ViewportMode,
    pub data_start_time: f64,
    pub current_time: f64,
    pub samples_seen: u64,
    pub min_y: Option<f64>,
    pub max_y: Option<f64>,
    pub visible_range: Option<VisibleRange>,
    pub channels: Vec<ChannelSnapshot>,
}

pub struct StreamingController<R: RendererAdapter> {
    stream: StreamSettings,
    source: Arc<dyn SampleSource>,
    renderer: R,
    channels: Vec<Channel<R::Handle>>,
    statistics: RunningStatistics,
    viewport: ViewportState,
    scheduler: TickScheduler,
    lifecycle: Lifecycle,
    samples_emitted: u64,
    last_range: Option<VisibleRange>,
}

impl<R: RendererAdapter> StreamingController<R> {
    /// Register every configured channel with the renderer. Ticks are sent to
    /// `ticks` once [`StreamingController::start`] is called.
    pub fn new(
        stream: StreamSettings,
        channels: &[ChannelSettings],
        source: Arc<dyn SampleSource>,
        mut renderer: R,
        ticks: mpsc::Sender<Tick>,
    ) -> Result<Self, ControllerError> {
        stream.validate()?;

        let channels = channels
            .iter()
            .enumerate()
            .map(|(id, settings)| {
                let handle = renderer.create_channel(&settings.name, &settings.color);
                renderer.set_visible(&handle, settings.initially_visible);
                Channel::new(
                    id,
                    settings.name.clone(),
                    settings.color.clone(),
                    settings.initially_visible,
                    handle,
                )
            })
            .collect();

        Ok(Self {
            stream,
            source,
            renderer,
            channels,
            statistics: RunningStatistics::new(),
            viewport: ViewportState::new(),
            scheduler: TickScheduler::new(ticks),
            lifecycle: Lifecycle::Idle,
            samples_emitted: 0,
            last_range: None,
        })
    }

    /// Begin ticking. Does nothing while already streaming or once disposed.
    pub fn start(&mut self) {
        if matches!(self.lifecycle, Lifecycle::Streaming | Lifecycle::Disposed) {
            return;
        }
        let generation = self.scheduler.start(self.stream.tick_period());
        self.lifecycle = Lifecycle::Streaming;
        tracing::info!(
            generation,
            channels = self.channels.len(),
            points_per_second = self.stream.points_per_second,
            chunk_size = self.stream.chunk_size,
            "Streaming started"
        );
    }

    pub fn stop(&mut self) {
        self.scheduler.stop();
        if self.lifecycle == Lifecycle::Streaming {
            self.lifecycle = Lifecycle::Stopped;
            tracing::info!("Streaming stopped");
        }
    }

    /// Stop, drop all data and statistics, force AUTO, then start a new
    /// chain from time zero. The old chain is cancelled before any buffer is
    /// cleared.
    pub fn restart(&mut self) {
        self.stop();

        for channel in &mut self.channels {
            channel.clear();
            self.renderer.clear_channel(channel.handle());
        }
        self.statistics.reset();
        self.samples_emitted = 0;
        self.viewport.force_auto();
        self.push_range();

        self.start();
    }

    /// Run one ingestion step: sample every channel, append, update the
    /// statistics, and refit the view when in AUTO.
    pub fn on_tick(&mut self, tick: Tick) -> Result<TickOutcome, ControllerError> {
        if !self.scheduler.accepts(tick) {
            tracing::debug!(
                generation = tick.generation,
                current = self.scheduler.generation(),
                "Discarding stale tick"
            );
            return Ok(TickOutcome::Discarded);
        }
        if self.channels.is_empty() {
            return Ok(TickOutcome::Empty);
        }

        // Virtual time advances 1/points_per_second per sample
        let rate = f64::from(self.stream.points_per_second);
        let xs: Vec<f64> = (0..self.stream.chunk_size as u64)
            .map(|i| (self.samples_emitted + i) as f64 / rate)
            .collect();

        for channel in &mut self.channels {
            let id = channel.id();
            let ys: Vec<f64> = xs.iter().map(|&x| self.source.sample(id, x)).collect();
            let batch: Vec<DataPoint> = xs
                .iter()
                .zip(&ys)
                .map(|(&x, &y)| DataPoint::new(x, y))
                .collect();

            channel.append(&batch)?;
            // Hidden channels still count towards the auto-fit bounds
            for &y in &ys {
                self.statistics.update(y);
            }
            self.renderer.append_points(channel.handle(), &xs, &ys);
        }

        self.samples_emitted += xs.len() as u64;
        // The first record after a reset pins the start to the oldest sample.
        // Current time is the newest stored x rather than the advanced clock,
        // so the AUTO window ends on the last point.
        if let (Some(&oldest), Some(&newest)) = (xs.first(), xs.last()) {
            self.statistics.record_time(oldest);
            self.statistics.record_time(newest);
        }

        if self.viewport.mode() == ViewportMode::Auto {
            self.push_range();
        }

        Ok(TickOutcome::Ingested {
            samples: xs.len() * self.channels.len(),
        })
    }

    pub fn toggle_signal(&mut self, id: ChannelId) -> Result<CommandOutcome, ControllerError> {
        if !self.accepts_commands() {
            return Ok(self.ignore("toggle_signal"));
        }
        let channel = self
            .channels
            .get_mut(id)
            .ok_or(ControllerError::UnknownChannel(id))?;

        let visible = !channel.is_visible();
        channel.set_visible(visible);
        self.renderer.set_visible(channel.handle(), visible);
        tracing::debug!(channel = id, visible, "Signal toggled");
        Ok(CommandOutcome::Applied)
    }

    pub fn set_zoom(&mut self, axis: Axis, percent: f64) -> Result<CommandOutcome, ControllerError> {
        if !self.accepts_commands() {
            return Ok(self.ignore("set_zoom"));
        }
        self.viewport.set_zoom(axis, percent).inspect_err(|e| {
            tracing::warn!(?axis, "Rejected zoom: {}", e);
        })?;
        tracing::debug!(?axis, percent, "Zoom set");
        self.push_range();
        Ok(CommandOutcome::Applied)
    }

    pub fn set_position(
        &mut self,
        axis: Axis,
        percent: f64,
    ) -> Result<CommandOutcome, ControllerError> {
        if !self.accepts_commands() {
            return Ok(self.ignore("set_position"));
        }
        self.viewport.set_position(axis, percent).inspect_err(|e| {
            tracing::warn!(?axis, "Rejected position: {}", e);
        })?;
        tracing::debug!(?axis, percent, "Position set");
        self.push_range();
        Ok(CommandOutcome::Applied)
    }

    pub fn reset_view(&mut self) -> CommandOutcome {
        if !self.accepts_commands() {
            return self.ignore("reset_view");
        }
        self.viewport.reset();
        self.push_range();
        CommandOutcome::Applied
    }

    pub fn clear_data(&mut self) -> CommandOutcome {
        if !self.accepts_commands() {
            return self.ignore("clear_data");
        }
        tracing::info!("Clearing data and restarting ingestion");
        self.restart();
        CommandOutcome::Applied
    }

    /// Stop ticking and release the renderer. Later commands are ignored.
    pub fn dispose(&mut self) {
        if self.lifecycle == Lifecycle::Disposed {
            return;
        }
        self.stop();
        self.renderer.dispose();
        self.lifecycle = Lifecycle::Disposed;
        tracing::info!("Controller disposed");
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        let bounds = self.statistics.value_bounds();
        ControllerSnapshot {
            lifecycle: self.lifecycle,
            viewport: self.viewport.clone(),
            mode: self.viewport.mode(),
            data_start_time: self.statistics.data_start_time(),
            current_time: self.statistics.current_time(),
            samples_seen: self.statistics.samples_seen(),
            min_y: bounds.map(|(min, _)| min),
            max_y: bounds.map(|(_, max)| max),
            visible_range: self.last_range,
            channels: self
                .channels
                .iter()
                .map(|c| ChannelSnapshot {
                    id: c.id(),
                    name: c.name().to_string(),
                    color: c.color().to_string(),
                    visible: c.is_visible(),
                    points: c.len(),
                })
                .collect(),
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn statistics(&self) -> &RunningStatistics {
        &self.statistics
    }

    pub fn channels(&self) -> &[Channel<R::Handle>] {
        &self.channels
    }

    pub fn last_range(&self) -> Option<VisibleRange> {
        self.last_range
    }

    /// The tick the running chain delivers; lets callers drive ingestion
    /// without waiting on the timer.
    pub fn current_tick(&self) -> Tick {
        self.scheduler.current_tick()
    }

    fn accepts_commands(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Streaming | Lifecycle::Stopped)
    }

    fn ignore(&self, command: &str) -> CommandOutcome {
        tracing::debug!(command, lifecycle = ?self.lifecycle, "{}", ControllerError::NotInitialized);
        CommandOutcome::Ignored
    }

    fn push_range(&mut self) {
        let range = self.viewport.compute(&self.statistics);
        self.renderer.set_visible_range_x(range.x.min, range.x.max);
        if let Some(y) = range.y {
            self.renderer.set_visible_range_y(y.min, y.max);
        }
        self.last_range = Some(range);
    }
}
