//! Registry ports: read access to the device and profile catalogues.
//!
//! The command core only ever reads from registries; mutation belongs to
//! whatever adapter owns the catalogue.

use std::future::Future;

use edgecmd_domain::device::Device;
use edgecmd_domain::error::RegistryError;
use edgecmd_domain::id::DeviceId;
use edgecmd_domain::profile::{DeviceResource, Direction, ResourceOperation};

/// Looks up registered devices.
pub trait DeviceRegistry {
    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, RegistryError>> + Send;

    fn get_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Device>, RegistryError>> + Send;

    /// Every registered device, whatever its state.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, RegistryError>> + Send;
}

/// Resolves commands against device profiles.
pub trait ProfileRegistry {
    /// Whether `profile` has a profile resource named `command`.
    ///
    /// The check is made against profile resources, not against the
    /// profile's command catalogue.
    fn command_exists(
        &self,
        profile: &str,
        command: &str,
    ) -> impl Future<Output = Result<bool, RegistryError>> + Send;

    /// Operations of the profile resource `command` for `direction`, in order.
    ///
    /// Fails when the profile or the command cannot be found.
    fn resource_operations(
        &self,
        profile: &str,
        command: &str,
        direction: Direction,
    ) -> impl Future<Output = Result<Vec<ResourceOperation>, RegistryError>> + Send;

    fn device_resource(
        &self,
        profile: &str,
        resource: &str,
    ) -> impl Future<Output = Result<Option<DeviceResource>, RegistryError>> + Send;
}

impl<T: DeviceRegistry + Send + Sync> DeviceRegistry for std::sync::Arc<T> {
    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, RegistryError>> + Send {
        (**self).get_by_id(id)
    }

    fn get_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Device>, RegistryError>> + Send {
        (**self).get_by_name(name)
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, RegistryError>> + Send {
        (**self).get_all()
    }
}

impl<T: ProfileRegistry + Send + Sync> ProfileRegistry for std::sync::Arc<T> {
    fn command_exists(
        &self,
        profile: &str,
        command: &str,
    ) -> impl Future<Output = Result<bool, RegistryError>> + Send {
        (**self).command_exists(profile, command)
    }

    fn resource_operations(
        &self,
        profile: &str,
        command: &str,
        direction: Direction,
    ) -> impl Future<Output = Result<Vec<ResourceOperation>, RegistryError>> + Send {
        (**self).resource_operations(profile, command, direction)
    }

    fn device_resource(
        &self,
        profile: &str,
        resource: &str,
    ) -> impl Future<Output = Result<Option<DeviceResource>, RegistryError>> + Send {
        (**self).device_resource(profile, resource)
    }
}
