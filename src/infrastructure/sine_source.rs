// Sinusoid sample source - one configured waveform per channel
use crate::application::sample_source::SampleSource;
use crate::domain::channel::ChannelId;
use crate::infrastructure::config::{ChannelSettings, WaveShape, Waveform};

#[derive(Debug, Clone)]
pub struct SineWaveSource {
    waveforms: Vec<Waveform>,
}

impl SineWaveSource {
    pub fn new(waveforms: Vec<Waveform>) -> Self {
        Self { waveforms }
    }

    pub fn from_channels(channels: &[ChannelSettings]) -> Self {
        Self::new(channels.iter().map(|c| c.waveform).collect())
    }
}

impl SampleSource for SineWaveSource {
    /// Channels without a waveform read as a flat zero.
    fn sample(&self, channel: ChannelId, time: f64) -> f64 {
        let Some(wave) = self.waveforms.get(channel) else {
            return 0.0;
        };
        let phase = wave.frequency * time;
        let unit = match wave.shape {
            WaveShape::Sine => phase.sin(),
            WaveShape::Cosine => phase.cos(),
        };
        wave.offset + wave.amplitude * unit
    }
}
