//! In-memory device registry.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use edgecmd_app::ports::DeviceRegistry;
use edgecmd_domain::device::{Addressable, AdminState, Device};
use edgecmd_domain::error::{RegistryError, ValidationError};
use edgecmd_domain::id::DeviceId;

/// Device registry keeping every device in memory.
///
/// Device names are unique.
#[derive(Default)]
pub struct InMemoryDeviceRegistry {
    devices: RwLock<HashMap<DeviceId, Device>>,
}

impl InMemoryDeviceRegistry {
    /// Register a new device.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Validation`] when the device is invalid or
    /// its name is already taken.
    pub fn add(&self, device: Device) -> Result<(), RegistryError> {
        device.validate()?;
        let mut devices = self.write();
        if devices.values().any(|d| d.name == device.name) {
            return Err(ValidationError::Duplicate {
                kind: "device",
                name: device.name,
            }
            .into());
        }
        tracing::debug!(device = %device.name, "device added");
        devices.insert(device.id, device);
        Ok(())
    }

    /// Replace a registered device, matched by id.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DeviceNotFound`] for an unknown id, or a
    /// validation error.
    pub fn update(&self, device: Device) -> Result<(), RegistryError> {
        device.validate()?;
        let mut devices = self.write();
        if devices
            .values()
            .any(|d| d.name == device.name && d.id != device.id)
        {
            return Err(ValidationError::Duplicate {
                kind: "device",
                name: device.name,
            }
            .into());
        }
        let slot = devices
            .get_mut(&device.id)
            .ok_or_else(|| RegistryError::DeviceNotFound(device.id.to_string()))?;
        *slot = device;
        Ok(())
    }

    /// Change the address of the device named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DeviceNotFound`] for an unknown name.
    pub fn update_addressable(
        &self,
        name: &str,
        addressable: Addressable,
    ) -> Result<(), RegistryError> {
        let mut devices = self.write();
        let device = devices
            .values_mut()
            .find(|d| d.name == name)
            .ok_or_else(|| RegistryError::DeviceNotFound(name.to_string()))?;
        device.addressable = addressable;
        Ok(())
    }

    /// Lock or unlock a device.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DeviceNotFound`] for an unknown id.
    pub fn update_admin_state(&self, id: DeviceId, state: AdminState) -> Result<(), RegistryError> {
        let mut devices = self.write();
        let device = devices
            .get_mut(&id)
            .ok_or_else(|| RegistryError::DeviceNotFound(id.to_string()))?;
        tracing::info!(device = %device.name, ?state, "admin state changed");
        device.admin_state = state;
        Ok(())
    }

    /// Remove a device by id.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DeviceNotFound`] for an unknown id.
    pub fn remove(&self, id: DeviceId) -> Result<Device, RegistryError> {
        self.write()
            .remove(&id)
            .ok_or_else(|| RegistryError::DeviceNotFound(id.to_string()))
    }

    /// Remove a device by name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DeviceNotFound`] for an unknown name.
    pub fn remove_by_name(&self, name: &str) -> Result<Device, RegistryError> {
        let mut devices = self.write();
        let id = devices
            .values()
            .find(|d| d.name == name)
            .map(|d| d.id)
            .ok_or_else(|| RegistryError::DeviceNotFound(name.to_string()))?;
        devices
            .remove(&id)
            .ok_or_else(|| RegistryError::DeviceNotFound(name.to_string()))
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<DeviceId, Device>> {
        self.devices.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<DeviceId, Device>> {
        self.devices.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DeviceRegistry for InMemoryDeviceRegistry {
    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, RegistryError>> + Send {
        let found = self.read().get(&id).cloned();
        async { Ok(found) }
    }

    fn get_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Device>, RegistryError>> + Send {
        let found = self.read().values().find(|d| d.name == name).cloned();
        async { Ok(found) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, RegistryError>> + Send {
        let all: Vec<Device> = self.read().values().cloned().collect();
        async { Ok(all) }
    }
}
