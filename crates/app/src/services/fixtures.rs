//! In-memory port doubles and a small device catalogue for service tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use edgecmd_domain::device::{Addressable, AdminState, Device, OperatingState};
use edgecmd_domain::error::{DriverError, RegistryError};
use edgecmd_domain::id::DeviceId;
use edgecmd_domain::profile::{
    DeviceProfile, DeviceResource, Direction, ProfileResource, ResourceOperation, ValueProperties,
};
use edgecmd_domain::time::now_millis;
use edgecmd_domain::value::{CommandValue, Value};

use crate::ports::{CommandRequest, DeviceRegistry, ProfileRegistry, ProtocolDriver};

/// Driver address that makes [`ScriptedDriver`] fail.
pub const UNREACHABLE: &str = "unreachable";
/// Driver address that makes [`ScriptedDriver`] panic.
pub const CRASHING: &str = "crashing";

pub struct InMemoryDevices {
    devices: Vec<Device>,
}

impl InMemoryDevices {
    pub fn new(devices: Vec<Device>) -> Self {
        Self { devices }
    }
}

impl DeviceRegistry for InMemoryDevices {
    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, RegistryError>> + Send {
        let found = self.devices.iter().find(|d| d.id == id).cloned();
        async { Ok(found) }
    }

    fn get_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Device>, RegistryError>> + Send {
        let found = self.devices.iter().find(|d| d.name == name).cloned();
        async { Ok(found) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, RegistryError>> + Send {
        let all = self.devices.clone();
        async { Ok(all) }
    }
}

pub struct InMemoryProfiles {
    profiles: HashMap<String, DeviceProfile>,
    broken: bool,
}

impl InMemoryProfiles {
    pub fn new(profiles: Vec<DeviceProfile>) -> Self {
        Self {
            profiles: profiles.into_iter().map(|p| (p.name.clone(), p)).collect(),
            broken: false,
        }
    }

    /// A registry whose every lookup fails.
    pub fn broken() -> Self {
        Self {
            profiles: HashMap::new(),
            broken: true,
        }
    }

    fn profile(&self, name: &str) -> Result<&DeviceProfile, RegistryError> {
        if self.broken {
            return Err(RegistryError::Backend("registry offline".into()));
        }
        self.profiles
            .get(name)
            .ok_or_else(|| RegistryError::ProfileNotFound(name.to_string()))
    }
}

impl ProfileRegistry for InMemoryProfiles {
    fn command_exists(
        &self,
        profile: &str,
        command: &str,
    ) -> impl Future<Output = Result<bool, RegistryError>> + Send {
        let result = self
            .profile(profile)
            .map(|p| p.profile_resource(command).is_some());
        async { result }
    }

    fn resource_operations(
        &self,
        profile: &str,
        command: &str,
        direction: Direction,
    ) -> impl Future<Output = Result<Vec<ResourceOperation>, RegistryError>> + Send {
        let result = self.profile(profile).and_then(|p| {
            p.profile_resource(command)
                .map(|r| r.operations(direction).to_vec())
                .ok_or_else(|| RegistryError::CommandNotFound {
                    profile: profile.to_string(),
                    command: command.to_string(),
                })
        });
        async { result }
    }

    fn device_resource(
        &self,
        profile: &str,
        resource: &str,
    ) -> impl Future<Output = Result<Option<DeviceResource>, RegistryError>> + Send {
        let result = self
            .profile(profile)
            .map(|p| p.device_resource(resource).cloned());
        async { result }
    }
}

/// Driver answering reads from a fixed table and recording every batch.
#[derive(Default)]
pub struct ScriptedDriver {
    readings: HashMap<String, Value>,
    pub reads: Mutex<Vec<Vec<CommandRequest>>>,
    pub writes: Mutex<Vec<(Vec<CommandRequest>, Vec<CommandValue>)>>,
}

impl ScriptedDriver {
    pub fn with_reading(mut self, resource: &str, value: Value) -> Self {
        self.readings.insert(resource.to_string(), value);
        self
    }

    pub fn written(&self) -> Vec<(Vec<CommandRequest>, Vec<CommandValue>)> {
        self.writes.lock().unwrap().clone()
    }
}

impl ProtocolDriver for ScriptedDriver {
    fn read_commands(
        &self,
        address: &Addressable,
        requests: Vec<CommandRequest>,
    ) -> impl Future<Output = Result<Vec<CommandValue>, DriverError>> + Send {
        let result = match address.address.as_str() {
            UNREACHABLE => Err(DriverError::Unreachable {
                address: address.to_string(),
            }),
            CRASHING => panic!("driver crashed"),
            _ => {
                self.reads.lock().unwrap().push(requests.clone());
                requests
                    .iter()
                    .map(|request| {
                        let object = &request.operation.object;
                        self.readings
                            .get(object)
                            .cloned()
                            .map(|value| {
                                CommandValue::new(request.operation.clone(), now_millis(), value)
                            })
                            .ok_or_else(|| DriverError::Unsupported {
                                resource: object.clone(),
                                operation: "read",
                            })
                    })
                    .collect()
            }
        };
        async { result }
    }

    fn write_commands(
        &self,
        address: &Addressable,
        requests: Vec<CommandRequest>,
        values: Vec<CommandValue>,
    ) -> impl Future<Output = Result<(), DriverError>> + Send {
        let result = match address.address.as_str() {
            UNREACHABLE => Err(DriverError::Unreachable {
                address: address.to_string(),
            }),
            CRASHING => panic!("driver crashed"),
            _ => {
                self.writes.lock().unwrap().push((requests, values));
                Ok(())
            }
        };
        async { result }
    }
}

/// "Simple-Device": one boolean switch.
pub fn switch_profile() -> DeviceProfile {
    DeviceProfile::builder()
        .name("Simple-Device")
        .device_resource(DeviceResource::new("SwitchButton", ValueProperties::new("Bool")))
        .resource(
            ProfileResource::new("Switch")
                .with_get(ResourceOperation::new("SwitchButton"))
                .with_set(ResourceOperation::new("SwitchButton").with_parameter("Switch")),
        )
        .build()
        .unwrap()
}

/// "Thermostat": scaled temperature, mapped mode, asserted status.
pub fn thermostat_profile() -> DeviceProfile {
    let temperature = ValueProperties {
        scale: Some(0.5),
        ..ValueProperties::new("Float64")
    };
    let status = ValueProperties {
        assertion: Some("OK".to_string()),
        ..ValueProperties::new("String")
    };
    let level = ValueProperties {
        mask: Some(0x0F),
        ..ValueProperties::new("Uint8")
    };
    let setpoint = ValueProperties {
        offset: Some(10.0),
        ..ValueProperties::new("Int32")
    };
    let pressure = ValueProperties {
        scale: Some(10.0),
        ..ValueProperties::new("Uint8")
    };
    DeviceProfile::builder()
        .name("Thermostat")
        .device_resource(DeviceResource::new("Temperature", temperature))
        .device_resource(DeviceResource::new("Mode", ValueProperties::new("Uint8")))
        .device_resource(DeviceResource::new("Status", status))
        .device_resource(DeviceResource::new("Level", level))
        .device_resource(DeviceResource::new("Setpoint", setpoint))
        .device_resource(DeviceResource::new("Firmware", ValueProperties::new("blob")))
        .device_resource(DeviceResource::new("Pressure", pressure))
        .resource(
            ProfileResource::new("Temperature").with_get(ResourceOperation::new("Temperature")),
        )
        .resource(
            ProfileResource::new("Mode")
                .with_get(
                    ResourceOperation::new("Mode")
                        .with_mapping("0", "Off")
                        .with_mapping("1", "On"),
                )
                .with_set(
                    ResourceOperation::new("Mode")
                        .with_mapping("Off", "0")
                        .with_mapping("On", "1"),
                ),
        )
        .resource(ProfileResource::new("Status").with_get(ResourceOperation::new("Status")))
        .resource(ProfileResource::new("Level").with_get(ResourceOperation::new("Level")))
        .resource(
            ProfileResource::new("Setpoint")
                .with_set(ResourceOperation::new("Setpoint"))
                .with_set(ResourceOperation::new("Temperature").with_parameter("Setpoint")),
        )
        .resource(ProfileResource::new("Firmware").with_set(ResourceOperation::new("Firmware")))
        .resource(
            ProfileResource::new("Weather")
                .with_get(ResourceOperation::new("Pressure"))
                .with_get(ResourceOperation::new("Temperature")),
        )
        .resource(ProfileResource::new("Ghost").with_get(ResourceOperation::new("Phantom")))
        .resource(
            ProfileResource::new("Climate")
                .with_get(ResourceOperation::new("Temperature"))
                .with_get(ResourceOperation::new("Mode"))
                .with_get(ResourceOperation::new("Status")),
        )
        .build()
        .unwrap()
}

pub fn device(name: &str, profile: &str) -> Device {
    device_at(name, profile, "10.0.0.1")
}

pub fn device_at(name: &str, profile: &str, address: &str) -> Device {
    Device::builder()
        .name(name)
        .profile(profile)
        .addressable(Addressable::new("virtual", address))
        .build()
        .unwrap()
}

pub fn locked(mut device: Device) -> Device {
    device.admin_state = AdminState::Locked;
    device
}

pub fn disabled(mut device: Device) -> Device {
    device.operating_state = OperatingState::Disabled;
    device
}

pub fn profiles() -> InMemoryProfiles {
    InMemoryProfiles::new(vec![switch_profile(), thermostat_profile()])
}

pub fn thermostat_driver() -> ScriptedDriver {
    ScriptedDriver::default()
        .with_reading("SwitchButton", Value::Bool(true))
        .with_reading("Temperature", Value::Float64(43.0))
        .with_reading("Mode", Value::Uint8(1))
        .with_reading("Status", Value::String("OK".to_string()))
        .with_reading("Level", Value::Uint8(0xA7))
        .with_reading("Pressure", Value::Uint8(200))
}
