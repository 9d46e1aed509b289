//! # edgecmd-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `DeviceRegistry` — look up devices by id, by name, or all of them
//!   - `ProfileRegistry` — resolve commands, resource operations and device resources
//!   - `ProtocolDriver` — read and write batches of resource values on a device
//!   - `EventSink` — hand read events to whoever consumes them downstream
//! - Define the **driving/inbound** use-case:
//!   - `CommandService` — dispatch a command to one device, or fan it out to all of them
//!   - `ReadPipeline` / `WritePipeline` — the per-device command logic
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `edgecmd-domain` only (plus `tokio` for tasks and channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod config;
pub mod event_bus;
pub mod ports;
pub mod services;
