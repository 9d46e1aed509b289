//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod driver;
pub mod event_sink;
pub mod registry;

pub use driver::{CommandRequest, ProtocolDriver};
pub use event_sink::EventSink;
pub use registry::{DeviceRegistry, ProfileRegistry};
