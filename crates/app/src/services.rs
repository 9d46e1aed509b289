//! Application services — use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod command_service;
pub mod read_pipeline;
pub mod write_pipeline;

mod resources;

#[cfg(test)]
mod fixtures;
