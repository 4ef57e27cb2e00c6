// Application layer - collaborator traits, scheduler, controller and its actor
pub mod controller;
pub mod renderer;
pub mod sample_source;
pub mod scheduler;
pub mod streaming_service;
