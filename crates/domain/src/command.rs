//! How a caller addresses a device and what it asks for.

use std::fmt;

use crate::id::DeviceId;

/// Which device a single-device command targets.
///
/// An id takes precedence over a name whenever the caller supplies one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceSelector {
    Id(DeviceId),
    Name(String),
}

impl fmt::Display for DeviceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// Read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Set,
}

impl Method {
    /// Interpret a request method: `get` in any case reads, anything else writes.
    #[must_use]
    pub fn from_request(method: &str) -> Self {
        if method.eq_ignore_ascii_case("get") {
            Self::Get
        } else {
            Self::Set
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("get"),
            Self::Set => f.write_str("set"),
        }
    }
}
