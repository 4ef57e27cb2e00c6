// Sample source trait - pluggable signal generator
use crate::domain::channel::ChannelId;

/// Produces the value of a channel at a virtual time. Implementations must be
/// deterministic: the same `(channel, time)` always yields the same value.
pub trait SampleSource: Send + Sync {
    fn sample(&self, channel: ChannelId, time: f64) -> f64;
}

impl<F> SampleSource for F
where
    F: Fn(ChannelId, f64) -> f64 + Send + Sync,
{
    fn sample(&self, channel: ChannelId, time: f64) -> f64 {
        self(channel, time)
    }
}
