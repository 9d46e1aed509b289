//! # edgecmd-adapter-virtual
//!
//! In-memory registries and a simulated protocol driver, used for testing and
//! demonstration.
//!
//! ## Provided demo devices
//!
//! | Device | Profile | Commands |
//! |--------|---------|----------|
//! | `Switch-1` | `Simple-Device` | `Switch` (read/write `SwitchButton`) |
//! | `Thermostat-1` | `Thermostat` | `Temperature`, `Mode`, `Status`, `Setpoint`, `Climate` |
//!
//! ## Dependency rule
//!
//! Depends on `edgecmd-app` (port traits) and `edgecmd-domain` only.

pub mod catalog;
mod devices;
mod driver;
mod profiles;

pub use devices::InMemoryDeviceRegistry;
pub use driver::SimulatedDriver;
pub use profiles::InMemoryProfileRegistry;
