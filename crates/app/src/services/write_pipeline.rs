//! Write pipeline: executes a "set" command on one device.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use edgecmd_domain::device::Device;
use edgecmd_domain::error::{BadRequestError, CommandError, ServerError};
use edgecmd_domain::profile::{Direction, ResourceOperation};
use edgecmd_domain::transform::transform_write;
use edgecmd_domain::value::{CommandValue, coerce};

use crate::config::CommandConfig;
use crate::ports::{CommandRequest, ProfileRegistry, ProtocolDriver};
use crate::services::resources::{check_operation_limit, device_resource};

/// Write use-case, shared by single-device and fan-out commands.
pub struct WritePipeline<PR, D> {
    profiles: Arc<PR>,
    driver: Arc<D>,
    config: CommandConfig,
}

impl<PR, D> WritePipeline<PR, D>
where
    PR: ProfileRegistry + Send + Sync,
    D: ProtocolDriver + Send + Sync,
{
    pub fn new(profiles: Arc<PR>, driver: Arc<D>, config: CommandConfig) -> Self {
        Self {
            profiles,
            driver,
            config,
        }
    }

    /// Write the parameters in `body` to `device` through `command`.
    ///
    /// `body` is a flat JSON object of parameter names to string values.
    /// Parameters no set operation declares are dropped; the driver is called
    /// even when nothing is left to write.
    ///
    /// # Errors
    ///
    /// - [`CommandError::BadRequest`] when the set operations cannot be
    ///   resolved, the body is malformed, or a value does not coerce to its
    ///   declared type.
    /// - [`CommandError::Server`] when the operation limit is exceeded, a
    ///   device resource is missing, a write transform fails, or the driver
    ///   fails.
    #[tracing::instrument(skip(self, device, body), fields(device = %device.name))]
    pub async fn execute(
        &self,
        device: &Device,
        command: &str,
        body: &[u8],
    ) -> Result<(), CommandError> {
        let operations = self
            .profiles
            .resource_operations(&device.profile, command, Direction::Set)
            .await
            .map_err(|source| {
                tracing::error!(error = %source, "cannot resolve set operations");
                BadRequestError::Operations {
                    profile: device.profile.clone(),
                    command: command.to_string(),
                    source,
                }
            })?;
        check_operation_limit(device, command, operations.len(), self.config.max_cmd_ops)?;

        let by_parameter = operations_by_parameter(operations);
        let values = self.parse_write_params(device, &by_parameter, body).await?;

        let mut requests = Vec::with_capacity(values.len());
        let mut outgoing = Vec::with_capacity(values.len());
        for value in values {
            let resource =
                device_resource(&*self.profiles, device, &value.operation().object).await?;
            let value = if self.config.data_transform {
                transform_write(&value, &resource.properties).map_err(|err| {
                    tracing::error!(%value, error = %err, "write transform failed");
                    ServerError::from(err)
                })?
            } else {
                value
            };
            requests.push(CommandRequest {
                operation: value.operation().clone(),
                resource,
            });
            outgoing.push(value);
        }

        tracing::debug!(operations = requests.len(), "writing to driver");
        self.driver
            .write_commands(&device.addressable, requests, outgoing)
            .await
            .map_err(|source| {
                tracing::error!(error = %source, "driver write failed");
                ServerError::Driver {
                    device: device.name.clone(),
                    command: command.to_string(),
                    source,
                }
                .into()
            })
    }

    /// Turn the request body into command values, one per known parameter.
    async fn parse_write_params(
        &self,
        device: &Device,
        by_parameter: &HashMap<String, ResourceOperation>,
        body: &[u8],
    ) -> Result<Vec<CommandValue>, CommandError> {
        let params: BTreeMap<String, String> = serde_json::from_slice(body).map_err(|err| {
            tracing::error!(error = %err, "cannot parse write parameters");
            BadRequestError::MalformedBody(err)
        })?;

        let mut values = Vec::with_capacity(params.len());
        for (name, raw) in &params {
            let Some(operation) = by_parameter.get(name) else {
                tracing::warn!(parameter = %name, "no resource operation for parameter");
                continue;
            };
            let raw = if operation.mappings.is_empty() {
                raw.as_str()
            } else if let Some(mapped) = operation.mapped(raw) {
                mapped
            } else {
                tracing::warn!(
                    parameter = %name,
                    value = %raw,
                    mappings = ?operation.mappings,
                    "no mapping matched, writing raw value"
                );
                raw.as_str()
            };

            let resource = device_resource(&*self.profiles, device, &operation.object).await?;
            let value =
                coerce(&resource.properties.value_type, operation, raw).map_err(|err| {
                    tracing::error!(parameter = %name, value = %raw, error = %err, "cannot coerce");
                    BadRequestError::from(err)
                })?;
            values.push(value);
        }
        Ok(values)
    }
}

/// Index set operations by parameter name; a later duplicate wins.
#[must_use]
pub fn operations_by_parameter(
    operations: Vec<ResourceOperation>,
) -> HashMap<String, ResourceOperation> {
    operations
        .into_iter()
        .map(|op| (op.parameter.clone(), op))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures::{
        InMemoryProfiles, ScriptedDriver, UNREACHABLE, device, device_at, profiles,
        thermostat_driver,
    };
    use edgecmd_domain::error::ErrorKind;
    use edgecmd_domain::value::{CoercionError, Value};

    type Pipeline = WritePipeline<InMemoryProfiles, ScriptedDriver>;

    fn make_pipeline(config: CommandConfig) -> (Pipeline, Arc<ScriptedDriver>) {
        let driver = Arc::new(thermostat_driver());
        let pipeline = WritePipeline::new(Arc::new(profiles()), Arc::clone(&driver), config);
        (pipeline, driver)
    }

    fn switch() -> Device {
        device("Switch-1", "Simple-Device")
    }

    fn thermostat() -> Device {
        device("Thermostat-1", "Thermostat")
    }

    #[tokio::test]
    async fn should_write_switch_value() {
        let (pipeline, driver) = make_pipeline(CommandConfig::default());

        pipeline
            .execute(&switch(), "Switch", br#"{"Switch":"True"}"#)
            .await
            .unwrap();

        let writes = driver.written();
        assert_eq!(writes.len(), 1);
        let (requests, values) = &writes[0];
        assert_eq!(requests[0].resource.name, "SwitchButton");
        assert_eq!(values[0].value(), &Value::Bool(true));
        assert_eq!(values[0].operation().object, "SwitchButton");
    }

    #[tokio::test]
    async fn should_reject_value_that_does_not_coerce() {
        let (pipeline, driver) = make_pipeline(CommandConfig::default());

        let err = pipeline
            .execute(&switch(), "Switch", br#"{"Switch":"NotBoolean"}"#)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CommandError::BadRequest(BadRequestError::Coercion(CoercionError::InvalidBool { .. }))
        ));
        assert!(driver.written().is_empty());
    }

    #[tokio::test]
    async fn should_send_empty_batch_when_no_parameter_matches() {
        let (pipeline, driver) = make_pipeline(CommandConfig::default());

        pipeline
            .execute(&switch(), "Switch", br#"{"Unknown":"True"}"#)
            .await
            .unwrap();

        let writes = driver.written();
        assert_eq!(writes.len(), 1);
        assert!(writes[0].0.is_empty());
        assert!(writes[0].1.is_empty());
    }

    #[tokio::test]
    async fn should_reject_malformed_body() {
        let (pipeline, _driver) = make_pipeline(CommandConfig::default());

        let bodies: [&[u8]; 4] = [b"not json", br#"{"Switch":true}"#, br#"["Switch"]"#, b""];
        for body in bodies {
            let err = pipeline.execute(&switch(), "Switch", body).await.unwrap_err();
            assert!(matches!(
                err,
                CommandError::BadRequest(BadRequestError::MalformedBody(_))
            ));
        }
    }

    #[tokio::test]
    async fn should_return_bad_request_for_unknown_command() {
        let (pipeline, _driver) = make_pipeline(CommandConfig::default());

        let err = pipeline
            .execute(&switch(), "Dimmer", br#"{"Dimmer":"1"}"#)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[tokio::test]
    async fn should_substitute_mapped_parameter_value() {
        let (pipeline, driver) = make_pipeline(CommandConfig::default());

        pipeline
            .execute(&thermostat(), "Mode", br#"{"Mode":"On"}"#)
            .await
            .unwrap();

        let writes = driver.written();
        assert_eq!(writes[0].1[0].value(), &Value::Uint8(1));
    }

    #[tokio::test]
    async fn should_pass_unmapped_parameter_value_through() {
        let (pipeline, driver) = make_pipeline(CommandConfig::default());

        pipeline
            .execute(&thermostat(), "Mode", br#"{"Mode":"0"}"#)
            .await
            .unwrap();

        assert_eq!(driver.written()[0].1[0].value(), &Value::Uint8(0));
    }

    #[tokio::test]
    async fn should_let_later_duplicate_parameter_win() {
        let (pipeline, driver) = make_pipeline(CommandConfig::default());

        pipeline
            .execute(&thermostat(), "Setpoint", br#"{"Setpoint":"42"}"#)
            .await
            .unwrap();

        let writes = driver.written();
        let (requests, values) = &writes[0];
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].resource.name, "Temperature");
        // Float64 with scale 0.5 inverted
        assert_eq!(values[0].value(), &Value::Float64(84.0));
    }

    #[tokio::test]
    async fn should_skip_write_transform_when_disabled() {
        let config = CommandConfig {
            data_transform: false,
            ..CommandConfig::default()
        };
        let (pipeline, driver) = make_pipeline(config);

        pipeline
            .execute(&thermostat(), "Setpoint", br#"{"Setpoint":"42"}"#)
            .await
            .unwrap();

        assert_eq!(driver.written()[0].1[0].value(), &Value::Float64(42.0));
    }

    #[tokio::test]
    async fn should_fail_fast_on_unsupported_declared_type() {
        let (pipeline, _driver) = make_pipeline(CommandConfig::default());

        let err = pipeline
            .execute(&thermostat(), "Firmware", br#"{"Firmware":"v2"}"#)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CommandError::BadRequest(BadRequestError::Coercion(CoercionError::UnsupportedType(_)))
        ));
    }

    #[tokio::test]
    async fn should_fail_when_operations_exceed_limit() {
        let config = CommandConfig {
            max_cmd_ops: 1,
            ..CommandConfig::default()
        };
        let (pipeline, _driver) = make_pipeline(config);

        let err = pipeline
            .execute(&thermostat(), "Setpoint", br#"{"Setpoint":"1"}"#)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CommandError::Server(ServerError::OperationLimitExceeded { .. })
        ));
    }

    #[tokio::test]
    async fn should_report_driver_failure_as_server_error() {
        let (pipeline, _driver) = make_pipeline(CommandConfig::default());
        let offline = device_at("Switch-2", "Simple-Device", UNREACHABLE);

        let err = pipeline
            .execute(&offline, "Switch", br#"{"Switch":"false"}"#)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ServerError);
    }

    #[test]
    fn should_index_operations_by_parameter() {
        let ops = vec![
            ResourceOperation::new("A").with_parameter("p"),
            ResourceOperation::new("B"),
            ResourceOperation::new("C").with_parameter("p"),
        ];

        let map = operations_by_parameter(ops);

        assert_eq!(map.len(), 2);
        assert_eq!(map["p"].object, "C");
        assert_eq!(map["B"].object, "B");
    }
}
