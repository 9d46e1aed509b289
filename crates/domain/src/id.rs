//! Typed identifiers.
//!
//! Devices, profiles and events are each keyed by their own UUID newtype so
//! one kind of id cannot be passed where another is expected. Ids travel as
//! bare UUID strings, both in JSON and in request paths.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl Default for $name {
            fn default() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s).map(Self)
            }
        }
    };
}

define_id!(
    /// Identifier of a registered [`Device`](crate::device::Device).
    DeviceId
);

define_id!(
    /// Identifier of a [`DeviceProfile`](crate::profile::DeviceProfile).
    ProfileId
);

define_id!(
    /// Identifier stamped on every [`Event`](crate::event::Event).
    EventId
);
