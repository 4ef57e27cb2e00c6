// Domain layer - channel buffers, statistics and the viewport state machine
pub mod channel;
pub mod error;
pub mod statistics;
pub mod viewport;
