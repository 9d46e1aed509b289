//! Demo catalogue: a switch and a thermostat, ready to be commanded.

use edgecmd_domain::device::{Addressable, Device};
use edgecmd_domain::error::{RegistryError, ValidationError};
use edgecmd_domain::profile::{
    CommandDescriptor, DeviceProfile, DeviceResource, ProfileResource, ReadWrite,
    ResourceOperation, ValueProperties,
};

use crate::{InMemoryDeviceRegistry, InMemoryProfileRegistry};

/// "Simple-Device": a single boolean switch.
///
/// # Errors
///
/// Returns a [`ValidationError`] if the profile is invalid.
pub fn simple_device_profile() -> Result<DeviceProfile, ValidationError> {
    let switch = ValueProperties {
        default_value: Some("false".to_string()),
        ..ValueProperties::new("Bool")
    };
    DeviceProfile::builder()
        .name("Simple-Device")
        .manufacturer("Simple Corp.")
        .model("SP-01")
        .device_resource(DeviceResource::new("SwitchButton", switch))
        .resource(
            ProfileResource::new("Switch")
                .with_get(ResourceOperation::new("SwitchButton"))
                .with_set(ResourceOperation::new("SwitchButton").with_parameter("Switch")),
        )
        .command(command("Switch", &["Switch"]))
        .build()
}

/// "Thermostat": temperature in tenths of a degree, a mapped mode, a
/// self-checking status and a writable setpoint.
///
/// # Errors
///
/// Returns a [`ValidationError`] if the profile is invalid.
pub fn thermostat_profile() -> Result<DeviceProfile, ValidationError> {
    let temperature = ValueProperties {
        read_write: ReadWrite::Read,
        default_value: Some("215".to_string()),
        scale: Some(0.1),
        ..ValueProperties::new("Float64")
    };
    let mode = ValueProperties {
        default_value: Some("0".to_string()),
        ..ValueProperties::new("Uint8")
    };
    let status = ValueProperties {
        read_write: ReadWrite::Read,
        default_value: Some("OK".to_string()),
        assertion: Some("OK".to_string()),
        ..ValueProperties::new("String")
    };
    let setpoint = ValueProperties {
        default_value: Some("200".to_string()),
        scale: Some(0.1),
        ..ValueProperties::new("Int16")
    };

    DeviceProfile::builder()
        .name("Thermostat")
        .manufacturer("Acme Climate")
        .model("TH-200")
        .device_resource(DeviceResource::new("Temperature", temperature))
        .device_resource(DeviceResource::new("Mode", mode))
        .device_resource(DeviceResource::new("Status", status))
        .device_resource(DeviceResource::new("Setpoint", setpoint))
        .resource(
            ProfileResource::new("Temperature").with_get(ResourceOperation::new("Temperature")),
        )
        .resource(
            ProfileResource::new("Mode")
                .with_get(mode_operation(&[("0", "Off"), ("1", "Heat"), ("2", "Cool")]))
                .with_set(mode_operation(&[("Off", "0"), ("Heat", "1"), ("Cool", "2")])),
        )
        .resource(ProfileResource::new("Status").with_get(ResourceOperation::new("Status")))
        .resource(
            ProfileResource::new("Setpoint")
                .with_get(ResourceOperation::new("Setpoint"))
                .with_set(ResourceOperation::new("Setpoint")),
        )
        .resource(
            ProfileResource::new("Climate")
                .with_get(ResourceOperation::new("Temperature"))
                .with_get(mode_operation(&[("0", "Off"), ("1", "Heat"), ("2", "Cool")]))
                .with_get(ResourceOperation::new("Setpoint"))
                .with_set(mode_operation(&[("Off", "0"), ("Heat", "1"), ("Cool", "2")]))
                .with_set(ResourceOperation::new("Setpoint")),
        )
        .command(command("Temperature", &[]))
        .command(command("Mode", &["Mode"]))
        .command(command("Status", &[]))
        .command(command("Setpoint", &["Setpoint"]))
        .command(command("Climate", &["Mode", "Setpoint"]))
        .build()
}

/// The demo devices, one per demo profile.
///
/// # Errors
///
/// Returns a [`ValidationError`] if a device is invalid.
pub fn demo_devices() -> Result<Vec<Device>, ValidationError> {
    Ok(vec![
        Device::builder()
            .name("Switch-1")
            .profile("Simple-Device")
            .addressable(Addressable::new("virtual", "switch-1"))
            .build()?,
        Device::builder()
            .name("Thermostat-1")
            .profile("Thermostat")
            .addressable(Addressable::new("virtual", "thermostat-1").with_path("zone/1"))
            .build()?,
    ])
}

/// Registries preloaded with the demo profiles and devices.
///
/// # Errors
///
/// Returns a [`RegistryError`] if the catalogue cannot be registered.
pub fn demo() -> Result<(InMemoryDeviceRegistry, InMemoryProfileRegistry), RegistryError> {
    let profiles = InMemoryProfileRegistry::default();
    profiles.add(simple_device_profile()?)?;
    profiles.add(thermostat_profile()?)?;

    let devices = InMemoryDeviceRegistry::default();
    for device in demo_devices()? {
        devices.add(device)?;
    }
    Ok((devices, profiles))
}

fn mode_operation(mappings: &[(&str, &str)]) -> ResourceOperation {
    mappings
        .iter()
        .fold(ResourceOperation::new("Mode"), |op, (from, to)| {
            op.with_mapping(*from, *to)
        })
}

fn command(name: &str, parameters: &[&str]) -> CommandDescriptor {
    CommandDescriptor {
        name: name.to_string(),
        readable: true,
        parameter_names: parameters.iter().map(ToString::to_string).collect(),
    }
}
