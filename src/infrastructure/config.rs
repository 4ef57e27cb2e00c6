// Controller configuration - file + environment layers
use crate::domain::error::ControllerError;
use anyhow::Context;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub stream: StreamSettings,
    #[serde(default = "default_channels")]
    pub channels: Vec<ChannelSettings>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct StreamSettings {
    #[serde(default = "default_points_per_second")]
    pub points_per_second: u32,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            points_per_second: default_points_per_second(),
            chunk_size: default_chunk_size(),
        }
    }
}

impl StreamSettings {
    pub fn validate(&self) -> Result<(), ControllerError> {
        if self.points_per_second == 0 {
            return Err(ControllerError::InvalidConfig(
                "points_per_second must be greater than zero".to_string(),
            ));
        }
        if self.chunk_size == 0 {
            return Err(ControllerError::InvalidConfig(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Wall time covered by one chunk, rounded to whole milliseconds.
    pub fn tick_period(&self) -> Duration {
        let seconds = self.chunk_size as f64 / f64::from(self.points_per_second);
        Duration::from_millis((seconds * 1000.0).round().max(1.0) as u64)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ChannelSettings {
    pub name: String,
    pub color: String,
    #[serde(default = "default_visible")]
    pub initially_visible: bool,
    #[serde(default)]
    pub waveform: Waveform,
}

impl ChannelSettings {
    pub fn new(name: &str, color: &str, waveform: Waveform) -> Self {
        Self {
            name: name.to_string(),
            color: color.to_string(),
            initially_visible: true,
            waveform,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WaveShape {
    #[default]
    Sine,
    Cosine,
}

/// `offset + amplitude * shape(frequency * t)`
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct Waveform {
    pub shape: WaveShape,
    pub offset: f64,
    pub amplitude: f64,
    pub frequency: f64,
}

impl Default for Waveform {
    fn default() -> Self {
        Self {
            shape: WaveShape::Sine,
            offset: 0.0,
            amplitude: 1.0,
            frequency: 1.0,
        }
    }
}

impl Waveform {
    pub fn new(shape: WaveShape, offset: f64, amplitude: f64, frequency: f64) -> Self {
        Self {
            shape,
            offset,
            amplitude,
            frequency,
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_points_per_second() -> u32 {
    200
}

fn default_chunk_size() -> usize {
    10
}

fn default_visible() -> bool {
    true
}

pub fn default_channels() -> Vec<ChannelSettings> {
    vec![
        ChannelSettings::new(
            "Pressure actual value [bar]",
            "#1a237e",
            Waveform::new(WaveShape::Sine, 60.0, 10.0, 2.0),
        ),
        ChannelSettings::new(
            "Pressure set value [bar]",
            "#e53935",
            Waveform::new(WaveShape::Sine, 100.0, 50.0, 1.0),
        ),
        ChannelSettings::new(
            "Temperature motor oil [°C]",
            "#03A9F4",
            Waveform::new(WaveShape::Cosine, 80.0, 30.0, 1.5),
        ),
    ]
}

/// Load `config/controller.toml` (optional) overlaid with `CONTROLLER__*`
/// environment variables.
pub fn load_settings() -> anyhow::Result<Settings> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/controller").required(false))
        .add_source(environment())
        .build()
        .context("Failed to read controller configuration")?;

    finish(settings)
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("CONTROLLER")
        .separator("__")
        .try_parsing(true)
}

fn finish(settings: config::Config) -> anyhow::Result<Settings> {
    let settings: Settings = settings
        .try_deserialize()
        .context("Failed to parse controller configuration")?;
    settings.stream.validate()?;
    Ok(settings)
}
