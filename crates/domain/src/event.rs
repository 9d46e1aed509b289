//! Readings and events produced by read commands.
//!
//! One [`Event`] is produced per successful read invocation and handed to
//! the downstream event sink. Events are built fresh for each request and
//! never stored by the gateway.

use serde::{Deserialize, Serialize};

use crate::id::EventId;
use crate::time::{OriginMillis, now_millis};
use crate::value::{CommandValue, ValueType};

/// A command value bound to the device it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    pub device: String,
    /// Name of the device resource that was read.
    pub name: String,
    pub value: String,
    pub value_type: ValueType,
    pub origin: OriginMillis,
}

impl Reading {
    /// Bind `value` to `device`.
    #[must_use]
    pub fn from_command_value(value: &CommandValue, device: &str) -> Self {
        Self {
            device: device.to_string(),
            name: value.operation().object.clone(),
            value: value.value().to_string(),
            value_type: value.value_type(),
            origin: value.origin(),
        }
    }
}

/// The readings produced by one read command on one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub device: String,
    pub origin: OriginMillis,
    pub readings: Vec<Reading>,
}

impl Event {
    /// Create an event stamped with the current time.
    #[must_use]
    pub fn new(device: impl Into<String>, readings: Vec<Reading>) -> Self {
        Self {
            id: EventId::new(),
            device: device.into(),
            origin: now_millis(),
            readings,
        }
    }
}
