//! Lookups shared by the read and write pipelines.

use edgecmd_domain::device::Device;
use edgecmd_domain::error::ServerError;
use edgecmd_domain::profile::{DeviceResource, ResourceOperation};

use crate::ports::{CommandRequest, ProfileRegistry};

/// Reject commands resolving to more operations than allowed.
pub(crate) fn check_operation_limit(
    device: &Device,
    command: &str,
    count: usize,
    max: usize,
) -> Result<(), ServerError> {
    if count > max {
        let err = ServerError::OperationLimitExceeded {
            device: device.name.clone(),
            command: command.to_string(),
            count,
            max,
        };
        tracing::error!(error = %err, "operation limit exceeded");
        return Err(err);
    }
    Ok(())
}

/// Resolve the device resource named `resource` in the device's profile.
pub(crate) async fn device_resource<PR: ProfileRegistry>(
    profiles: &PR,
    device: &Device,
    resource: &str,
) -> Result<DeviceResource, ServerError> {
    tracing::debug!(resource, "resolving device resource");
    profiles
        .device_resource(&device.profile, resource)
        .await?
        .ok_or_else(|| {
            tracing::error!(
                device = %device.name,
                profile = %device.profile,
                resource,
                "no device resource for operation"
            );
            ServerError::MissingResource {
                profile: device.profile.clone(),
                resource: resource.to_string(),
            }
        })
}

/// Pair every operation with the device resource it targets.
pub(crate) async fn command_requests<PR: ProfileRegistry>(
    profiles: &PR,
    device: &Device,
    operations: Vec<ResourceOperation>,
) -> Result<Vec<CommandRequest>, ServerError> {
    let mut requests = Vec::with_capacity(operations.len());
    for operation in operations {
        let resource = device_resource(profiles, device, &operation.object).await?;
        requests.push(CommandRequest {
            operation,
            resource,
        });
    }
    Ok(requests)
}
