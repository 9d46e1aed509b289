//! Shared application state for axum handlers.

use std::sync::Arc;

use edgecmd_app::ports::{DeviceRegistry, EventSink, ProfileRegistry, ProtocolDriver};
use edgecmd_app::services::command_service::CommandService;

/// Application state shared across all axum handlers.
///
/// Generic over the registries, driver and event sink to avoid dynamic
/// dispatch. `Clone` is implemented manually so the underlying types
/// themselves do not need to be `Clone`; only the `Arc` is cloned.
pub struct AppState<DR, PR, D, S> {
    /// Device command service.
    pub command_service: Arc<CommandService<DR, PR, D, S>>,
}

impl<DR, PR, D, S> Clone for AppState<DR, PR, D, S> {
    fn clone(&self) -> Self {
        Self {
            command_service: Arc::clone(&self.command_service),
        }
    }
}

impl<DR, PR, D, S> AppState<DR, PR, D, S>
where
    DR: DeviceRegistry + Send + Sync + 'static,
    PR: ProfileRegistry + Send + Sync + 'static,
    D: ProtocolDriver + Send + Sync + 'static,
    S: EventSink + Send + Sync + 'static,
{
    /// Create a new application state from the command service.
    pub fn new(command_service: CommandService<DR, PR, D, S>) -> Self {
        Self {
            command_service: Arc::new(command_service),
        }
    }

    /// Create a new application state from a pre-wrapped `Arc` service.
    pub fn from_arc(command_service: Arc<CommandService<DR, PR, D, S>>) -> Self {
        Self { command_service }
    }
}
