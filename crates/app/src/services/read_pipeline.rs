//! Read pipeline: executes a "get" command on one device.
//!
//! The pipeline resolves the command's operations, reads them from the driver
//! in a single batch, post-processes every value (transform, assertion,
//! mapping) and turns the result into an [`Event`] that is also handed to the
//! event sink.

use std::sync::Arc;

use edgecmd_domain::device::Device;
use edgecmd_domain::error::{CommandError, NotFoundError, ServerError};
use edgecmd_domain::event::{Event, Reading};
use edgecmd_domain::profile::{DeviceResource, Direction};
use edgecmd_domain::transform::{check_assertion, map_value, transform_read};
use edgecmd_domain::value::CommandValue;

use crate::config::CommandConfig;
use crate::ports::{EventSink, ProfileRegistry, ProtocolDriver};
use crate::services::resources::{check_operation_limit, command_requests, device_resource};

/// Read use-case, shared by single-device and fan-out commands.
pub struct ReadPipeline<PR, D, S> {
    profiles: Arc<PR>,
    driver: Arc<D>,
    sink: Arc<S>,
    config: CommandConfig,
}

impl<PR, D, S> ReadPipeline<PR, D, S>
where
    PR: ProfileRegistry + Send + Sync,
    D: ProtocolDriver + Send + Sync,
    S: EventSink + Send + Sync + 'static,
{
    pub fn new(profiles: Arc<PR>, driver: Arc<D>, sink: Arc<S>, config: CommandConfig) -> Self {
        Self {
            profiles,
            driver,
            sink,
            config,
        }
    }

    /// Read `command` from `device` and return the resulting event.
    ///
    /// The event is published to the sink on a detached task; a publishing
    /// failure is logged and never reaches the caller.
    ///
    /// # Errors
    ///
    /// - [`CommandError::NotFound`] when the command's get operations cannot
    ///   be resolved.
    /// - [`CommandError::Server`] when the operation limit is exceeded, a
    ///   device resource is missing, the driver fails, or any read transform
    ///   failed.
    #[tracing::instrument(skip(self, device), fields(device = %device.name))]
    pub async fn execute(&self, device: &Device, command: &str) -> Result<Event, CommandError> {
        let operations = self
            .profiles
            .resource_operations(&device.profile, command, Direction::Get)
            .await
            .map_err(|source| {
                tracing::error!(error = %source, "cannot resolve get operations");
                NotFoundError::Operations {
                    profile: device.profile.clone(),
                    command: command.to_string(),
                    source,
                }
            })?;
        check_operation_limit(device, command, operations.len(), self.config.max_cmd_ops)?;

        let requests = command_requests(&*self.profiles, device, operations).await?;
        let values = self
            .driver
            .read_commands(&device.addressable, requests)
            .await
            .map_err(|source| {
                tracing::error!(error = %source, "driver read failed");
                ServerError::Driver {
                    device: device.name.clone(),
                    command: command.to_string(),
                    source,
                }
            })?;

        let mut transforms_ok = true;
        let mut readings = Vec::with_capacity(values.len());
        for value in values {
            let resource =
                device_resource(&*self.profiles, device, &value.operation().object).await?;
            let value = self.post_process(value, &resource, &mut transforms_ok);
            let reading = Reading::from_command_value(&value, &device.name);
            tracing::debug!(resource = %resource.name, value = %reading.value, "reading");
            readings.push(reading);
        }

        if !transforms_ok {
            tracing::error!(readings = readings.len(), "transform failed");
            return Err(ServerError::TransformsFailed {
                device: device.name.clone(),
                command: command.to_string(),
            }
            .into());
        }

        let event = Event::new(device.name.clone(), readings);
        self.publish(event.clone());
        Ok(event)
    }

    /// Transform, assert and map one value, in that order.
    fn post_process(
        &self,
        value: CommandValue,
        resource: &DeviceResource,
        transforms_ok: &mut bool,
    ) -> CommandValue {
        let mut value = value;
        if self.config.data_transform {
            match transform_read(&value, &resource.properties) {
                Ok(transformed) => value = transformed,
                Err(err) => {
                    tracing::error!(%value, error = %err, "read transform failed");
                    *transforms_ok = false;
                }
            }
        }

        if let Err(failure) = check_assertion(&value, resource.properties.assertion.as_deref()) {
            tracing::error!(resource = %resource.name, %failure, "assertion failed");
            value = failure.to_command_value(&value);
        }

        if !value.operation().mappings.is_empty() {
            match map_value(&value) {
                Some(mapped) => value = mapped,
                None => tracing::warn!(
                    %value,
                    mappings = ?value.operation().mappings,
                    "no mapping matched, keeping raw value"
                ),
            }
        }
        value
    }

    fn publish(&self, event: Event) {
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            let event_id = event.id;
            if let Err(err) = sink.publish(event).await {
                tracing::error!(%event_id, error = %err, "failed to publish event");
            }
        });
    }
}
