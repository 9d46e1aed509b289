//! A registered endpoint that commands are issued against.
//!
//! A device references the [`DeviceProfile`](crate::profile::DeviceProfile)
//! describing its resources by name, carries two state gates and the
//! protocol address handed to the driver.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::DeviceId;

/// Administrative gate. A locked device accepts no command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AdminState {
    #[default]
    Unlocked,
    Locked,
}

/// Operational gate. Disabled devices are skipped by multi-device commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperatingState {
    #[default]
    Enabled,
    Disabled,
}

/// Where and how the driver reaches a device.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Addressable {
    pub protocol: String,
    pub address: String,
    pub port: Option<u16>,
    pub path: Option<String>,
}

impl Addressable {
    #[must_use]
    pub fn new(protocol: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            address: address.into(),
            port: None,
            path: None,
        }
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl fmt::Display for Addressable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.protocol, self.address)?;
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        if let Some(path) = &self.path {
            if !path.starts_with('/') {
                f.write_str("/")?;
            }
            f.write_str(path)?;
        }
        Ok(())
    }
}

/// A registered device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    /// Name of the profile describing this device's resources.
    pub profile: String,
    pub admin_state: AdminState,
    pub operating_state: OperatingState,
    pub addressable: Addressable,
}

impl Device {
    /// Create a builder for constructing a [`Device`].
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] when `name` is empty and
    /// [`ValidationError::MissingProfile`] when no profile is referenced.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.profile.is_empty() {
            return Err(ValidationError::MissingProfile(self.name.clone()));
        }
        Ok(())
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.admin_state == AdminState::Locked
    }

    /// Whether the device takes part in multi-device commands.
    #[must_use]
    pub fn is_operational(&self) -> bool {
        !self.is_locked() && self.operating_state != OperatingState::Disabled
    }
}

/// Step-by-step builder for [`Device`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    id: Option<DeviceId>,
    name: Option<String>,
    profile: Option<String>,
    admin_state: AdminState,
    operating_state: OperatingState,
    addressable: Option<Addressable>,
}

impl DeviceBuilder {
    #[must_use]
    pub fn id(mut self, id: DeviceId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    #[must_use]
    pub fn admin_state(mut self, admin_state: AdminState) -> Self {
        self.admin_state = admin_state;
        self
    }

    #[must_use]
    pub fn operating_state(mut self, operating_state: OperatingState) -> Self {
        self.operating_state = operating_state;
        self
    }

    #[must_use]
    pub fn addressable(mut self, addressable: Addressable) -> Self {
        self.addressable = Some(addressable);
        self
    }

    /// Consume the builder, validate, and return a [`Device`].
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if `name` or `profile` is missing.
    pub fn build(self) -> Result<Device, ValidationError> {
        let device = Device {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            profile: self.profile.unwrap_or_default(),
            admin_state: self.admin_state,
            operating_state: self.operating_state,
            addressable: self.addressable.unwrap_or_default(),
        };
        device.validate()?;
        Ok(device)
    }
}
