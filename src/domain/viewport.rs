// Viewport state machine - AUTO fit vs MANUAL zoom/position
use super::error::ControllerError;
use super::statistics::RunningStatistics;
use serde::Serialize;

pub const DEFAULT_ZOOM_PERCENT: f64 = 100.0;
pub const DEFAULT_POSITION_PERCENT: f64 = 50.0;

/// Fraction of the value span added above and below when auto-fitting Y.
const AUTO_Y_PADDING: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewportMode {
    Auto,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn centered(center: f64, span: f64) -> Self {
        Self::new(center - span / 2.0, center + span / 2.0)
    }
}

/// The window pushed to the renderer. Y stays `None` until a value has been
/// observed, since the sentinel bounds would not produce a finite range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VisibleRange {
    pub x: AxisRange,
    pub y: Option<AxisRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewportState {
    mode: ViewportMode,
    x_zoom_percent: f64,
    y_zoom_percent: f64,
    x_position_percent: f64,
    y_position_percent: f64,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            mode: ViewportMode::Auto,
            x_zoom_percent: DEFAULT_ZOOM_PERCENT,
            y_zoom_percent: DEFAULT_ZOOM_PERCENT,
            x_position_percent: DEFAULT_POSITION_PERCENT,
            y_position_percent: DEFAULT_POSITION_PERCENT,
        }
    }
}

impl ViewportState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ViewportMode {
        self.mode
    }

    pub fn zoom(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x_zoom_percent,
            Axis::Y => self.y_zoom_percent,
        }
    }

    pub fn position(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x_position_percent,
            Axis::Y => self.y_position_percent,
        }
    }

    /// Set a zoom percentage and switch to MANUAL. Non-positive or non-finite
    /// levels are rejected without touching the state.
    pub fn set_zoom(&mut self, axis: Axis, percent: f64) -> Result<(), ControllerError> {
        if !percent.is_finite() || percent <= 0.0 {
            return Err(ControllerError::InvalidZoomLevel(percent));
        }
        match axis {
            Axis::X => self.x_zoom_percent = percent,
            Axis::Y => self.y_zoom_percent = percent,
        }
        self.mode = ViewportMode::Manual;
        Ok(())
    }

    /// Set a position percentage (clamped to 0..=100) and switch to MANUAL.
    pub fn set_position(&mut self, axis: Axis, percent: f64) -> Result<(), ControllerError> {
        if !percent.is_finite() {
            return Err(ControllerError::InvalidPosition(percent));
        }
        let percent = percent.clamp(0.0, 100.0);
        match axis {
            Axis::X => self.x_position_percent = percent,
            Axis::Y => self.y_position_percent = percent,
        }
        self.mode = ViewportMode::Manual;
        Ok(())
    }

    /// Back to AUTO with the default zoom and position.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Back to AUTO, keeping the zoom and position percentages so the next
    /// MANUAL adjustment starts from them.
    pub fn force_auto(&mut self) {
        self.mode = ViewportMode::Auto;
    }

    /// Range for the current mode from a snapshot of the statistics.
    pub fn compute(&self, stats: &RunningStatistics) -> VisibleRange {
        match self.mode {
            ViewportMode::Auto => Self::auto_range(stats),
            ViewportMode::Manual => self.manual_range(stats),
        }
    }

    /// Fit all data seen so far, with 10% padding on the value axis.
    pub fn auto_range(stats: &RunningStatistics) -> VisibleRange {
        let (start, current) = stats.time_bounds();
        let y = stats.value_bounds().map(|(min_y, max_y)| {
            let pad = AUTO_Y_PADDING * (max_y - min_y);
            AxisRange::new(min_y - pad, max_y + pad)
        });

        VisibleRange {
            x: AxisRange::new(start, current),
            y,
        }
    }

    /// Map the zoom/position percentages onto the accumulated totals.
    pub fn manual_range(&self, stats: &RunningStatistics) -> VisibleRange {
        let (start, current) = stats.time_bounds();
        let x = map_percentages(start, current, self.x_zoom_percent, self.x_position_percent);
        let y = stats.value_bounds().map(|(min_y, max_y)| {
            map_percentages(min_y, max_y, self.y_zoom_percent, self.y_position_percent)
        });

        VisibleRange { x, y }
    }
}

fn map_percentages(low: f64, high: f64, zoom_percent: f64, position_percent: f64) -> AxisRange {
    let total = high - low;
    let span = total * (100.0 / zoom_percent);
    let center = low + total * (position_percent / 100.0);
    AxisRange::centered(center, span)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(start: f64, current: f64, values: &[f64]) -> RunningStatistics {
        let mut stats = RunningStatistics::new();
        stats.record_time(start);
        stats.record_time(current);
        for &v in values {
            stats.update(v);
        }
        stats
    }

    #[test]
    fn test_auto_fits_time_and_pads_values() {
        let viewport = ViewportState::new();
        let range = viewport.compute(&stats(1.0, 4.0, &[10.0, 20.0]));

        assert_eq!(range.x, AxisRange::new(1.0, 4.0));
        assert_eq!(range.y, Some(AxisRange::new(9.0, 21.0)));
    }

    #[test]
    fn test_auto_without_values_has_no_y() {
        let range = ViewportState::new().compute(&RunningStatistics::new());
        assert_eq!(range.x, AxisRange::new(0.0, 0.0));
        assert_eq!(range.y, None);
    }

    #[test]
    fn test_manual_zoom_halves_centered_range() {
        let mut viewport = ViewportState::new();
        viewport.set_zoom(Axis::X, 200.0).unwrap();
        viewport.set_position(Axis::X, 50.0).unwrap();

        let range = viewport.compute(&stats(0.0, 10.0, &[0.0]));
        assert_eq!(viewport.mode(), ViewportMode::Manual);
        assert_eq!(range.x, AxisRange::new(2.5, 7.5));
    }

    #[test]
    fn test_manual_zoom_below_hundred_widens_range() {
        let mut viewport = ViewportState::new();
        viewport.set_zoom(Axis::Y, 50.0).unwrap();

        let range = viewport.compute(&stats(0.0, 10.0, &[0.0, 10.0]));
        // Default Y position keeps the doubled span centered
        assert_eq!(range.y, Some(AxisRange::new(-5.0, 15.0)));
        // X keeps default zoom and position
        assert_eq!(range.x, AxisRange::new(0.0, 10.0));
    }

    #[test]
    fn test_manual_position_moves_center() {
        let mut viewport = ViewportState::new();
        viewport.set_zoom(Axis::X, 400.0).unwrap();
        viewport.set_position(Axis::X, 100.0).unwrap();

        let range = viewport.compute(&stats(0.0, 8.0, &[1.0]));
        assert_eq!(range.x, AxisRange::new(7.0, 9.0));
    }

    #[test]
    fn test_invalid_zoom_leaves_state_unchanged() {
        let mut viewport = ViewportState::new();
        let before = viewport.clone();

        assert_eq!(
            viewport.set_zoom(Axis::X, 0.0),
            Err(ControllerError::InvalidZoomLevel(0.0))
        );
        assert!(viewport.set_zoom(Axis::Y, -10.0).is_err());
        assert!(viewport.set_zoom(Axis::Y, f64::NAN).is_err());
        assert_eq!(viewport, before);
        assert_eq!(viewport.mode(), ViewportMode::Auto);
    }

    #[test]
    fn test_position_is_clamped() {
        let mut viewport = ViewportState::new();
        viewport.set_position(Axis::Y, 140.0).unwrap();
        viewport.set_position(Axis::X, -3.0).unwrap();

        assert_eq!(viewport.position(Axis::Y), 100.0);
        assert_eq!(viewport.position(Axis::X), 0.0);
        assert!(viewport.set_position(Axis::X, f64::INFINITY).is_err());
    }

    #[test]
    fn test_reset_returns_to_auto_defaults() {
        let mut viewport = ViewportState::new();
        viewport.set_zoom(Axis::X, 300.0).unwrap();
        viewport.set_position(Axis::Y, 10.0).unwrap();

        viewport.reset();
        assert_eq!(viewport, ViewportState::default());
        assert_eq!(viewport.zoom(Axis::X), DEFAULT_ZOOM_PERCENT);
        assert_eq!(viewport.position(Axis::Y), DEFAULT_POSITION_PERCENT);
    }

    #[test]
    fn test_force_auto_keeps_percentages() {
        let mut viewport = ViewportState::new();
        viewport.set_zoom(Axis::X, 300.0).unwrap();
        viewport.set_position(Axis::Y, 10.0).unwrap();

        viewport.force_auto();
        assert_eq!(viewport.mode(), ViewportMode::Auto);
        assert_eq!(viewport.zoom(Axis::X), 300.0);
        assert_eq!(viewport.position(Axis::Y), 10.0);

        // The next adjustment reuses the other sliders
        viewport.set_position(Axis::Y, 20.0).unwrap();
        assert_eq!(viewport.mode(), ViewportMode::Manual);
        assert_eq!(viewport.zoom(Axis::X), 300.0);
    }
}
