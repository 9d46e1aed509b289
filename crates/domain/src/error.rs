//! Common error types used across the workspace.
//!
//! Every failure a command can produce is a [`CommandError`]. Its variant is
//! the caller-visible [`ErrorKind`]; the wrapped leaf error carries the typed
//! cause. Adapters convert their own errors into [`RegistryError`] or
//! [`DriverError`] at the port boundary.

use crate::transform::TransformError;
use crate::value::CoercionError;

/// Boxed error used for opaque adapter failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Caller-visible classification of a [`CommandError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Locked,
    BadRequest,
    ServerError,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => f.write_str("not found"),
            Self::Locked => f.write_str("locked"),
            Self::BadRequest => f.write_str("bad request"),
            Self::ServerError => f.write_str("server error"),
        }
    }
}

/// Top-level error returned by command handling.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    Locked(#[from] LockedError),

    #[error(transparent)]
    BadRequest(#[from] BadRequestError),

    #[error(transparent)]
    Server(#[from] ServerError),
}

impl CommandError {
    /// The caller-visible kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Locked(_) => ErrorKind::Locked,
            Self::BadRequest(_) => ErrorKind::BadRequest,
            Self::Server(_) => ErrorKind::ServerError,
        }
    }
}

/// A device or command could not be resolved.
#[derive(Debug, thiserror::Error)]
pub enum NotFoundError {
    #[error("device {0} not found")]
    Device(String),

    #[error("command {command} not found for device {device}")]
    Command { device: String, command: String },

    #[error("cannot resolve get operations for command {command} in profile {profile}")]
    Operations {
        profile: String,
        command: String,
        #[source]
        source: RegistryError,
    },
}

/// The device's admin state forbids commands.
#[derive(Debug, thiserror::Error)]
#[error("device {device} is locked")]
pub struct LockedError {
    pub device: String,
}

/// The caller sent something the gateway cannot act on.
#[derive(Debug, thiserror::Error)]
pub enum BadRequestError {
    #[error("cannot resolve set operations for command {command} in profile {profile}")]
    Operations {
        profile: String,
        command: String,
        #[source]
        source: RegistryError,
    },

    #[error("write parameters must be a flat JSON object of strings")]
    MalformedBody(#[source] serde_json::Error),

    #[error(transparent)]
    Coercion(#[from] CoercionError),
}

/// An internal failure: broken invariants, registry or driver errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("lookup of command {command} for device {device} failed")]
    CommandLookup {
        device: String,
        command: String,
        #[source]
        source: RegistryError,
    },

    #[error("max operations ({max}) exceeded for device {device} command {command}: {count}")]
    OperationLimitExceeded {
        device: String,
        command: String,
        count: usize,
        max: usize,
    },

    #[error("no device resource {resource} in profile {profile}")]
    MissingResource { profile: String, resource: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("driver failed for device {device} command {command}")]
    Driver {
        device: String,
        command: String,
        #[source]
        source: DriverError,
    },

    #[error("transform failed for device {device} command {command}")]
    TransformsFailed { device: String, command: String },

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("command task for device {device} did not complete")]
    Task {
        device: String,
        #[source]
        source: BoxError,
    },
}

/// Domain invariant violations raised by builders.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("device {0} must reference a profile")]
    MissingProfile(String),

    #[error("resource operation must reference a device resource")]
    MissingObject,

    #[error("duplicate {kind} {name} in profile")]
    Duplicate { kind: &'static str, name: String },
}

/// Failure reported by a device or profile registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("device {0} not found")]
    DeviceNotFound(String),

    #[error("profile {0} not found")]
    ProfileNotFound(String),

    #[error("command {command} not found in profile {profile}")]
    CommandNotFound { profile: String, command: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("registry backend error")]
    Backend(#[source] BoxError),
}

/// Failure reported by a protocol driver.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("device at {address} is unreachable")]
    Unreachable { address: String },

    #[error("resource {resource} does not support {operation}")]
    Unsupported {
        resource: String,
        operation: &'static str,
    },

    #[error("driver received {values} values for {requests} requests")]
    BatchMismatch { requests: usize, values: usize },

    #[error("driver backend error")]
    Backend(#[source] BoxError),
}
