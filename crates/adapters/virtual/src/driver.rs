//! Simulated protocol driver holding resource values in memory.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use edgecmd_app::ports::{CommandRequest, ProtocolDriver};
use edgecmd_domain::device::Addressable;
use edgecmd_domain::error::DriverError;
use edgecmd_domain::profile::DeviceResource;
use edgecmd_domain::time::now_millis;
use edgecmd_domain::value::{CommandValue, Value, ValueType};

type Key = (String, String);

/// A driver whose "devices" are entries in a map keyed by address and
/// resource name.
///
/// A resource never written reads as its declared default value, or as the
/// zero value of its type.
#[derive(Default)]
pub struct SimulatedDriver {
    values: Mutex<HashMap<Key, Value>>,
}

impl SimulatedDriver {
    /// Simulate a device-side change of `resource` on the device at `address`.
    ///
    /// Unlike a command write, this ignores the resource's read/write
    /// permission, so read-only resources can be driven too.
    pub fn set_value(&self, address: &Addressable, resource: &str, value: Value) {
        self.lock().insert(key(address, resource), value);
    }

    /// Current raw value of `resource`, if it was ever written.
    #[must_use]
    pub fn value(&self, address: &Addressable, resource: &str) -> Option<Value> {
        self.lock().get(&key(address, resource)).cloned()
    }

    fn read_one(
        &self,
        address: &Addressable,
        request: CommandRequest,
    ) -> Result<CommandValue, DriverError> {
        let resource = &request.resource;
        if !resource.properties.read_write.is_readable() {
            return Err(DriverError::Unsupported {
                resource: resource.name.clone(),
                operation: "read",
            });
        }
        let stored = self.value(address, &resource.name);
        let value = match stored {
            Some(value) => value,
            None => initial_value(resource)?,
        };
        Ok(CommandValue::new(request.operation, now_millis(), value))
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Key, Value>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ProtocolDriver for SimulatedDriver {
    fn read_commands(
        &self,
        address: &Addressable,
        requests: Vec<CommandRequest>,
    ) -> impl Future<Output = Result<Vec<CommandValue>, DriverError>> + Send {
        tracing::debug!(%address, requests = requests.len(), "simulated read");
        let result = requests
            .into_iter()
            .map(|request| self.read_one(address, request))
            .collect::<Result<Vec<_>, _>>();
        async { result }
    }

    fn write_commands(
        &self,
        address: &Addressable,
        requests: Vec<CommandRequest>,
        values: Vec<CommandValue>,
    ) -> impl Future<Output = Result<(), DriverError>> + Send {
        tracing::debug!(%address, requests = requests.len(), "simulated write");
        let result = self.write_all(address, &requests, values);
        async { result }
    }
}

impl SimulatedDriver {
    fn write_all(
        &self,
        address: &Addressable,
        requests: &[CommandRequest],
        values: Vec<CommandValue>,
    ) -> Result<(), DriverError> {
        if requests.len() != values.len() {
            return Err(DriverError::BatchMismatch {
                requests: requests.len(),
                values: values.len(),
            });
        }
        if let Some(request) = requests
            .iter()
            .find(|r| !r.resource.properties.read_write.is_writable())
        {
            return Err(DriverError::Unsupported {
                resource: request.resource.name.clone(),
                operation: "write",
            });
        }
        let mut stored = self.lock();
        for (request, value) in requests.iter().zip(values) {
            stored.insert(key(address, &request.resource.name), value.value().clone());
        }
        Ok(())
    }
}

fn key(address: &Addressable, resource: &str) -> Key {
    (address.to_string(), resource.to_string())
}

fn initial_value(resource: &DeviceResource) -> Result<Value, DriverError> {
    let properties = &resource.properties;
    let value_type: ValueType = properties
        .value_type
        .parse()
        .map_err(|err| DriverError::Backend(Box::new(err)))?;
    let raw = properties
        .default_value
        .as_deref()
        .unwrap_or(match value_type {
            ValueType::Bool => "false",
            ValueType::String => "",
            _ => "0",
        });
    Value::parse(value_type, raw).map_err(|err| DriverError::Backend(Box::new(err)))
}
