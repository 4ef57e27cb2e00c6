// Controller error kinds
use super::channel::ChannelId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControllerError {
    /// A batch would break the strictly increasing x order of a channel.
    /// Only a scheduler defect can cause this, so it is treated as fatal.
    #[error("channel {channel}: sample at x={next} does not follow x={previous}")]
    OrderingViolation {
        channel: ChannelId,
        previous: f64,
        next: f64,
    },

    #[error("zoom level must be a positive percentage, got {0}")]
    InvalidZoomLevel(f64),

    #[error("position must be a finite percentage, got {0}")]
    InvalidPosition(f64),

    #[error("no channel with id {0}")]
    UnknownChannel(ChannelId),

    #[error("controller has not started streaming")]
    NotInitialized,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ControllerError {
    /// Fatal errors indicate a logic defect and must stop the controller.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ControllerError::OrderingViolation { .. })
    }
}
