// Tick scheduler - cancellable repeating timer stamped with a generation
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// One scheduled ingestion step. Only ticks carrying the scheduler's current
/// generation are accepted, so ticks queued before a stop are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub generation: u64,
}

pub struct TickScheduler {
    ticks: mpsc::Sender<Tick>,
    generation: u64,
    running: bool,
    timer: Option<JoinHandle<()>>,
}

impl TickScheduler {
    pub fn new(ticks: mpsc::Sender<Tick>) -> Self {
        Self {
            ticks,
            generation: 0,
            running: false,
            timer: None,
        }
    }

    /// Cancel any running timer and start a new chain. The first tick fires
    /// immediately, the rest every `period`. Must be called inside a tokio
    /// runtime.
    pub fn start(&mut self, period: Duration) -> u64 {
        self.stop();
        self.generation += 1;
        self.running = true;

        let ticks = self.ticks.clone();
        let tick = Tick {
            generation: self.generation,
        };
        self.timer = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if ticks.send(tick).await.is_err() {
                    break;
                }
            }
        }));

        tracing::debug!(generation = self.generation, ?period, "Tick chain started");
        self.generation
    }

    /// Cancel pending ticks. Safe to call any number of times.
    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        if self.running {
            self.running = false;
            self.generation += 1;
            tracing::debug!(generation = self.generation, "Tick chain stopped");
        }
    }

    pub fn accepts(&self, tick: Tick) -> bool {
        self.running && tick.generation == self.generation
    }

    /// The tick the current chain would deliver.
    pub fn current_tick(&self) -> Tick {
        Tick {
            generation: self.generation,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
