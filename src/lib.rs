// Streaming viewport controller - ingest multi-channel samples and drive the visible window
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
