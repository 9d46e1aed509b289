//! Protocol driver port, the side that talks to the physical device.

use std::future::Future;

use edgecmd_domain::device::Addressable;
use edgecmd_domain::error::DriverError;
use edgecmd_domain::profile::{DeviceResource, ResourceOperation};
use edgecmd_domain::value::CommandValue;

/// One resource operation paired with the device resource it targets.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandRequest {
    pub operation: ResourceOperation,
    pub resource: DeviceResource,
}

/// Executes batches of resource operations against a device.
///
/// A batch is always handed over in one call so the driver can make use of
/// protocol-level batching.
pub trait ProtocolDriver {
    /// Read every requested resource, returning one value per request.
    fn read_commands(
        &self,
        address: &Addressable,
        requests: Vec<CommandRequest>,
    ) -> impl Future<Output = Result<Vec<CommandValue>, DriverError>> + Send;

    /// Write `values` to the requested resources, pairwise.
    fn write_commands(
        &self,
        address: &Addressable,
        requests: Vec<CommandRequest>,
        values: Vec<CommandValue>,
    ) -> impl Future<Output = Result<(), DriverError>> + Send;
}

impl<T: ProtocolDriver + Send + Sync> ProtocolDriver for std::sync::Arc<T> {
    fn read_commands(
        &self,
        address: &Addressable,
        requests: Vec<CommandRequest>,
    ) -> impl Future<Output = Result<Vec<CommandValue>, DriverError>> + Send {
        (**self).read_commands(address, requests)
    }

    fn write_commands(
        &self,
        address: &Addressable,
        requests: Vec<CommandRequest>,
        values: Vec<CommandValue>,
    ) -> impl Future<Output = Result<(), DriverError>> + Send {
        (**self).write_commands(address, requests, values)
    }
}
