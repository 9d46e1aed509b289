//! Device profiles: the schema a class of devices exposes.
//!
//! A profile declares:
//! - **device resources**: addressable points with value properties
//!   (declared type, access mode, assertion, transform parameters)
//! - **profile resources**: named groups of [`ResourceOperation`]s for the
//!   `get` and `set` directions. Command requests are resolved against these
//!   names.
//! - **commands**: the public command catalogue. Only used to describe the
//!   API; command resolution never consults it.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::ProfileId;

/// Direction of a resource operation list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Get,
    Set,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("get"),
            Self::Set => f.write_str("set"),
        }
    }
}

/// Link between a command parameter and a device resource.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceOperation {
    /// Name of the target [`DeviceResource`].
    pub object: String,
    /// Key of the write request body carrying this operation's value.
    pub parameter: String,
    /// Optional value substitutions applied on read and write.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub mappings: HashMap<String, String>,
}

impl ResourceOperation {
    /// Operation targeting `object`, with the parameter named after it.
    #[must_use]
    pub fn new(object: impl Into<String>) -> Self {
        let object = object.into();
        Self {
            parameter: object.clone(),
            object,
            mappings: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameter = parameter.into();
        self
    }

    #[must_use]
    pub fn with_mapping(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.mappings.insert(from.into(), to.into());
        self
    }

    /// Mapped counterpart of `raw`, if the mapping table has one.
    #[must_use]
    pub fn mapped(&self, raw: &str) -> Option<&str> {
        self.mappings.get(raw).map(String::as_str)
    }
}

/// Access mode of a device resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReadWrite {
    #[serde(rename = "R")]
    Read,
    #[serde(rename = "W")]
    Write,
    #[default]
    #[serde(rename = "RW")]
    ReadWrite,
}

impl ReadWrite {
    #[must_use]
    pub fn is_readable(self) -> bool {
        matches!(self, Self::Read | Self::ReadWrite)
    }

    #[must_use]
    pub fn is_writable(self) -> bool {
        matches!(self, Self::Write | Self::ReadWrite)
    }
}

/// Value properties of a device resource.
///
/// `value_type` stays the raw declared name: it is resolved (case-insensitively)
/// when a value is coerced, so an unsupported name surfaces as a coercion error.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueProperties {
    #[serde(rename = "type")]
    pub value_type: String,
    pub read_write: ReadWrite,
    pub default_value: Option<String>,
    /// Expected textual value; readings that differ are flagged in-band.
    pub assertion: Option<String>,
    pub base: Option<f64>,
    pub scale: Option<f64>,
    pub offset: Option<f64>,
    pub mask: Option<u64>,
    /// Positive values shift left, negative values shift right.
    pub shift: Option<i32>,
}

impl ValueProperties {
    #[must_use]
    pub fn new(value_type: impl Into<String>) -> Self {
        Self {
            value_type: value_type.into(),
            ..Self::default()
        }
    }
}

/// One addressable point on a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceResource {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub properties: ValueProperties,
}

impl DeviceResource {
    #[must_use]
    pub fn new(name: impl Into<String>, properties: ValueProperties) -> Self {
        Self {
            name: name.into(),
            description: None,
            properties,
        }
    }
}

/// Named group of operations, addressed by command requests.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProfileResource {
    pub name: String,
    #[serde(default)]
    pub get: Vec<ResourceOperation>,
    #[serde(default)]
    pub set: Vec<ResourceOperation>,
}

impl ProfileResource {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_get(mut self, operation: ResourceOperation) -> Self {
        self.get.push(operation);
        self
    }

    #[must_use]
    pub fn with_set(mut self, operation: ResourceOperation) -> Self {
        self.set.push(operation);
        self
    }

    /// Operations for `direction`, in declaration order.
    #[must_use]
    pub fn operations(&self, direction: Direction) -> &[ResourceOperation] {
        match direction {
            Direction::Get => &self.get,
            Direction::Set => &self.set,
        }
    }
}

/// Entry of the public command catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommandDescriptor {
    pub name: String,
    #[serde(default)]
    pub readable: bool,
    #[serde(default)]
    pub parameter_names: Vec<String>,
}

/// Schema of resources and commands for a class of devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub id: ProfileId,
    pub name: String,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub device_resources: Vec<DeviceResource>,
    pub resources: Vec<ProfileResource>,
    pub commands: Vec<CommandDescriptor>,
}

impl DeviceProfile {
    /// Create a builder for constructing a [`DeviceProfile`].
    #[must_use]
    pub fn builder() -> DeviceProfileBuilder {
        DeviceProfileBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the name is empty, a resource name
    /// is declared twice, or an operation targets nothing.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let mut seen = std::collections::HashSet::new();
        for resource in &self.device_resources {
            if !seen.insert(resource.name.as_str()) {
                return Err(ValidationError::Duplicate {
                    kind: "device resource",
                    name: resource.name.clone(),
                });
            }
        }
        seen.clear();
        for resource in &self.resources {
            if !seen.insert(resource.name.as_str()) {
                return Err(ValidationError::Duplicate {
                    kind: "profile resource",
                    name: resource.name.clone(),
                });
            }
            let mut all_ops = resource.get.iter().chain(&resource.set);
            if all_ops.any(|op| op.object.is_empty()) {
                return Err(ValidationError::MissingObject);
            }
        }
        Ok(())
    }

    /// Look up a device resource by name.
    #[must_use]
    pub fn device_resource(&self, name: &str) -> Option<&DeviceResource> {
        self.device_resources.iter().find(|r| r.name == name)
    }

    /// Look up a profile resource by name.
    #[must_use]
    pub fn profile_resource(&self, name: &str) -> Option<&ProfileResource> {
        self.resources.iter().find(|r| r.name == name)
    }
}

/// Step-by-step builder for [`DeviceProfile`].
#[derive(Debug, Default)]
pub struct DeviceProfileBuilder {
    id: Option<ProfileId>,
    name: Option<String>,
    manufacturer: Option<String>,
    model: Option<String>,
    device_resources: Vec<DeviceResource>,
    resources: Vec<ProfileResource>,
    commands: Vec<CommandDescriptor>,
}

impl DeviceProfileBuilder {
    #[must_use]
    pub fn id(mut self, id: ProfileId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn device_resource(mut self, resource: DeviceResource) -> Self {
        self.device_resources.push(resource);
        self
    }

    #[must_use]
    pub fn resource(mut self, resource: ProfileResource) -> Self {
        self.resources.push(resource);
        self
    }

    #[must_use]
    pub fn command(mut self, command: CommandDescriptor) -> Self {
        self.commands.push(command);
        self
    }

    /// Consume the builder, validate, and return a [`DeviceProfile`].
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the profile breaks an invariant.
    pub fn build(self) -> Result<DeviceProfile, ValidationError> {
        let profile = DeviceProfile {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            manufacturer: self.manufacturer,
            model: self.model,
            device_resources: self.device_resources,
            resources: self.resources,
            commands: self.commands,
        };
        profile.validate()?;
        Ok(profile)
    }
}
