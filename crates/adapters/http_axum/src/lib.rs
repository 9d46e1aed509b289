//! # edgecmd-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **device command API** (`/api/v1/device/...`): `GET` reads a
//!   command, `PUT` writes one, on a single device or on all of them
//! - Map HTTP requests into [`CommandService`](edgecmd_app::services::command_service::CommandService)
//!   calls (driving adapter)
//! - Map command results and error kinds into HTTP responses
//!
//! ## Dependency rule
//! Depends on `edgecmd-app` (for port traits and services) and `edgecmd-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
