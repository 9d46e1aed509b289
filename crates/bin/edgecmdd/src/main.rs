//! # edgecmdd — edgecmd daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Install the `tracing` subscriber
//! - Construct registries, driver and event sink (adapters)
//! - Construct the command service, injecting adapters via port traits
//! - Build the axum router, injecting the service
//! - Bind to a TCP port and serve until interrupted
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use edgecmd_adapter_http_axum::state::AppState;
use edgecmd_adapter_virtual::{
    InMemoryDeviceRegistry, InMemoryProfileRegistry, SimulatedDriver, catalog,
};
use edgecmd_app::event_bus::InProcessEventBus;
use edgecmd_app::services::command_service::CommandService;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_tracing(&config.logging.filter);

    // Registries
    let (devices, profiles) = if config.virtual_devices.enabled {
        catalog::demo().context("failed to register demo devices")?
    } else {
        (
            InMemoryDeviceRegistry::default(),
            InMemoryProfileRegistry::default(),
        )
    };

    // Event bus
    let event_bus = InProcessEventBus::new(256);

    // Services
    let command_service = CommandService::new(
        devices,
        profiles,
        SimulatedDriver::default(),
        event_bus,
        config.command_config(),
    );

    // HTTP
    let app = edgecmd_adapter_http_axum::router::build(AppState::new(command_service));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(%bind_addr, "edgecmdd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("edgecmdd stopped");
    Ok(())
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
