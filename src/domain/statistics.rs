// Running statistics over everything ingested since the last reset

#[derive(Debug, Clone, PartialEq)]
pub struct RunningStatistics {
    min_y: f64,
    max_y: f64,
    data_start_time: f64,
    current_time: f64,
    time_recorded: bool,
    samples_seen: u64,
}

impl Default for RunningStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl RunningStatistics {
    pub fn new() -> Self {
        Self {
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
            data_start_time: 0.0,
            current_time: 0.0,
            time_recorded: false,
            samples_seen: 0,
        }
    }

    pub fn update(&mut self, value: f64) {
        self.min_y = self.min_y.min(value);
        self.max_y = self.max_y.max(value);
        self.samples_seen += 1;
    }

    /// Advance the current time. The first call after a reset also fixes the
    /// start of the data.
    pub fn record_time(&mut self, time: f64) {
        if !self.time_recorded {
            self.data_start_time = time;
            self.time_recorded = true;
        }
        self.current_time = self.current_time.max(time);
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    /// `(min, max)` of all values, or `None` while still at the sentinels.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        self.has_values().then_some((self.min_y, self.max_y))
    }

    pub fn time_bounds(&self) -> (f64, f64) {
        (self.data_start_time, self.current_time)
    }

    pub fn data_start_time(&self) -> f64 {
        self.data_start_time
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn has_values(&self) -> bool {
        self.min_y <= self.max_y
    }

    pub fn samples_seen(&self) -> u64 {
        self.samples_seen
    }
}
