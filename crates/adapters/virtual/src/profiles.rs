//! In-memory profile registry.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use edgecmd_app::ports::ProfileRegistry;
use edgecmd_domain::error::{RegistryError, ValidationError};
use edgecmd_domain::profile::{DeviceProfile, DeviceResource, Direction, ResourceOperation};

/// Profile registry keeping every profile in memory, keyed by name.
#[derive(Default)]
pub struct InMemoryProfileRegistry {
    profiles: RwLock<HashMap<String, DeviceProfile>>,
}

impl InMemoryProfileRegistry {
    /// Register a new profile.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Validation`] when the profile is invalid or
    /// its name is already taken.
    pub fn add(&self, profile: DeviceProfile) -> Result<(), RegistryError> {
        profile.validate()?;
        let mut profiles = self.write();
        if profiles.contains_key(&profile.name) {
            return Err(ValidationError::Duplicate {
                kind: "profile",
                name: profile.name,
            }
            .into());
        }
        tracing::debug!(profile = %profile.name, "profile added");
        profiles.insert(profile.name.clone(), profile);
        Ok(())
    }

    /// Replace the profile with the same name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ProfileNotFound`] for an unknown name, or a
    /// validation error.
    pub fn update(&self, profile: DeviceProfile) -> Result<(), RegistryError> {
        profile.validate()?;
        let mut profiles = self.write();
        let slot = profiles
            .get_mut(&profile.name)
            .ok_or_else(|| RegistryError::ProfileNotFound(profile.name.clone()))?;
        *slot = profile;
        Ok(())
    }

    /// Remove a profile by name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ProfileNotFound`] for an unknown name.
    pub fn remove_by_name(&self, name: &str) -> Result<DeviceProfile, RegistryError> {
        self.write()
            .remove(name)
            .ok_or_else(|| RegistryError::ProfileNotFound(name.to_string()))
    }

    fn lookup<T>(
        &self,
        name: &str,
        f: impl FnOnce(&DeviceProfile) -> Result<T, RegistryError>,
    ) -> Result<T, RegistryError> {
        let profiles = self.read();
        let profile = profiles
            .get(name)
            .ok_or_else(|| RegistryError::ProfileNotFound(name.to_string()))?;
        f(profile)
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, DeviceProfile>> {
        self.profiles.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, DeviceProfile>> {
        self.profiles.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ProfileRegistry for InMemoryProfileRegistry {
    fn command_exists(
        &self,
        profile: &str,
        command: &str,
    ) -> impl Future<Output = Result<bool, RegistryError>> + Send {
        let result = self.lookup(profile, |p| Ok(p.profile_resource(command).is_some()));
        async { result }
    }

    fn resource_operations(
        &self,
        profile: &str,
        command: &str,
        direction: Direction,
    ) -> impl Future<Output = Result<Vec<ResourceOperation>, RegistryError>> + Send {
        let result = self.lookup(profile, |p| {
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
        let result = self.lookup(profile, |p| Ok(p.device_resource(resource).cloned()));
        async { result }
    }
}
