//! Dispatches commands to one device or fans them out.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinSet;

use edgecmd_domain::command::{DeviceSelector, Method};
use edgecmd_domain::device::Device;
use edgecmd_domain::error::{CommandError, LockedError, NotFoundError, ServerError};
use edgecmd_domain::event::Event;

use crate::config::CommandConfig;
use crate::ports::{DeviceRegistry, EventSink, ProfileRegistry, ProtocolDriver};
use crate::services::read_pipeline::ReadPipeline;
use crate::services::write_pipeline::WritePipeline;

/// Outcome of a command fanned out to every operational device.
///
/// `error` is set only when every device failed; it then holds the error of
/// the device observed to finish last. Every failure is logged.
#[derive(Debug, Default)]
pub struct FanOut {
    pub events: Vec<Event>,
    pub error: Option<CommandError>,
}

struct Pipelines<PR, D, S> {
    read: ReadPipeline<PR, D, S>,
    write: WritePipeline<PR, D>,
}

impl<PR, D, S> Pipelines<PR, D, S>
where
    PR: ProfileRegistry + Send + Sync,
    D: ProtocolDriver + Send + Sync,
    S: EventSink + Send + Sync + 'static,
{
    async fn execute(
        &self,
        device: &Device,
        command: &str,
        method: Method,
        body: &[u8],
    ) -> Result<Option<Event>, CommandError> {
        match method {
            Method::Get => self.read.execute(device, command).await.map(Some),
            Method::Set => self.write.execute(device, command, body).await.map(|()| None),
        }
    }
}

/// Application service executing device commands.
///
/// Generic over the registries, the protocol driver and the event sink
/// (constructor injection). Cheap to share behind an `Arc`.
pub struct CommandService<DR, PR, D, S> {
    devices: DR,
    profiles: Arc<PR>,
    pipelines: Arc<Pipelines<PR, D, S>>,
}

impl<DR, PR, D, S> CommandService<DR, PR, D, S>
where
    DR: DeviceRegistry + Send + Sync,
    PR: ProfileRegistry + Send + Sync + 'static,
    D: ProtocolDriver + Send + Sync + 'static,
    S: EventSink + Send + Sync + 'static,
{
    /// Create a new service backed by the given ports.
    pub fn new(devices: DR, profiles: PR, driver: D, sink: S, config: CommandConfig) -> Self {
        let profiles = Arc::new(profiles);
        let driver = Arc::new(driver);
        let pipelines = Pipelines {
            read: ReadPipeline::new(
                Arc::clone(&profiles),
                Arc::clone(&driver),
                Arc::new(sink),
                config,
            ),
            write: WritePipeline::new(Arc::clone(&profiles), driver, config),
        };
        Self {
            devices,
            profiles,
            pipelines: Arc::new(pipelines),
        }
    }

    /// Execute `command` on the device picked by `selector`.
    ///
    /// A read returns its event; a write returns `None`.
    ///
    /// # Errors
    ///
    /// - [`CommandError::NotFound`] when the device or the command does not exist.
    /// - [`CommandError::Locked`] when the device is administratively locked.
    /// - [`CommandError::Server`] when the profile registry fails.
    /// - Any error of the read or write pipeline.
    #[tracing::instrument(skip(self, body))]
    pub async fn handle(
        &self,
        selector: &DeviceSelector,
        command: &str,
        method: Method,
        body: &[u8],
    ) -> Result<Option<Event>, CommandError> {
        let device = match selector {
            DeviceSelector::Id(id) => self.devices.get_by_id(*id).await,
            DeviceSelector::Name(name) => self.devices.get_by_name(name).await,
        }
        .map_err(ServerError::from)?
        .ok_or_else(|| {
            tracing::error!(device = %selector, "device not found");
            NotFoundError::Device(selector.to_string())
        })?;

        if device.is_locked() {
            tracing::error!(device = %device.name, "device is locked");
            return Err(LockedError {
                device: device.name,
            }
            .into());
        }

        let exists = self
            .profiles
            .command_exists(&device.profile, command)
            .await
            .map_err(|source| {
                tracing::error!(device = %device.name, error = %source, "command lookup failed");
                ServerError::CommandLookup {
                    device: device.name.clone(),
                    command: command.to_string(),
                    source,
                }
            })?;
        if !exists {
            tracing::error!(device = %device.name, "command not found");
            return Err(NotFoundError::Command {
                device: device.name,
                command: command.to_string(),
            }
            .into());
        }

        self.pipelines.execute(&device, command, method, body).await
    }

    /// Execute `command` on every operational device concurrently.
    ///
    /// Locked and disabled devices are skipped. Every task runs to completion;
    /// a panicking task counts as a failed device.
    #[tracing::instrument(skip(self, body))]
    pub async fn handle_all(&self, command: &str, method: Method, body: &[u8]) -> FanOut {
        let devices = match self.devices.get_all().await {
            Ok(devices) => devices,
            Err(err) => {
                tracing::error!(error = %err, "cannot list devices");
                return FanOut {
                    events: Vec::new(),
                    error: Some(ServerError::from(err).into()),
                };
            }
        };

        let body: Arc<[u8]> = Arc::from(body);
        let mut tasks = JoinSet::new();
        let mut names = HashMap::new();
        for device in devices.into_iter().filter(Device::is_operational) {
            let pipelines = Arc::clone(&self.pipelines);
            let command = command.to_string();
            let body = Arc::clone(&body);
            let name = device.name.clone();
            let handle = tasks.spawn(async move {
                pipelines.execute(&device, &command, method, &body).await
            });
            names.insert(handle.id(), name);
        }

        let total = names.len();
        tracing::debug!(devices = total, "fanning out command");

        let mut outcome = FanOut::default();
        let mut failures = 0;
        while let Some(joined) = tasks.join_next_with_id().await {
            let (device, result) = match joined {
                Ok((id, result)) => (names.remove(&id).unwrap_or_default(), result),
                Err(err) => {
                    let device = names.remove(&err.id()).unwrap_or_default();
                    let failure = ServerError::Task {
                        device: device.clone(),
                        source: err.to_string().into(),
                    };
                    (device, Err(failure.into()))
                }
            };
            match result {
                Ok(Some(event)) => outcome.events.push(event),
                Ok(None) => {}
                Err(err) => {
                    tracing::error!(%device, error = %err, "command failed");
                    failures += 1;
                    outcome.error = Some(err);
                }
            }
        }

        if failures < total {
            if failures > 0 {
                tracing::info!(failures, total, "command partially succeeded");
            }
            outcome.error = None;
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::InProcessEventBus;
    use crate::services::fixtures::{
        CRASHING, InMemoryDevices, InMemoryProfiles, ScriptedDriver, UNREACHABLE, device,
        device_at, disabled, locked, profiles, thermostat_driver,
    };
    use edgecmd_domain::error::ErrorKind;

    type Service =
        CommandService<InMemoryDevices, InMemoryProfiles, Arc<ScriptedDriver>, InProcessEventBus>;

    fn make_service(devices: Vec<Device>) -> (Service, Arc<ScriptedDriver>) {
        make_service_with(devices, profiles())
    }

    fn make_service_with(
        devices: Vec<Device>,
        profiles: InMemoryProfiles,
    ) -> (Service, Arc<ScriptedDriver>) {
        let driver = Arc::new(thermostat_driver());
        let service = CommandService::new(
            InMemoryDevices::new(devices),
            profiles,
            Arc::clone(&driver),
            InProcessEventBus::new(16),
            CommandConfig::default(),
        );
        (service, driver)
    }

    fn by_name(name: &str) -> DeviceSelector {
        DeviceSelector::Name(name.to_string())
    }

    #[tokio::test]
    async fn should_read_device_selected_by_name() {
        let (svc, _) = make_service(vec![device("Switch-1", "Simple-Device")]);

        let event = svc
            .handle(&by_name("Switch-1"), "Switch", Method::Get, b"")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(event.device, "Switch-1");
        assert_eq!(event.readings[0].value, "true");
    }

    #[tokio::test]
    async fn should_read_device_selected_by_id() {
        let switch = device("Switch-1", "Simple-Device");
        let id = switch.id;
        let (svc, _) = make_service(vec![switch]);

        let event = svc
            .handle(&DeviceSelector::Id(id), "Switch", Method::Get, b"")
            .await
            .unwrap();

        assert!(event.is_some());
    }

    #[tokio::test]
    async fn should_write_and_return_no_event() {
        let (svc, driver) = make_service(vec![device("Switch-1", "Simple-Device")]);

        let event = svc
            .handle(&by_name("Switch-1"), "Switch", Method::Set, br#"{"Switch":"True"}"#)
            .await
            .unwrap();

        assert!(event.is_none());
        assert_eq!(driver.written().len(), 1);
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_device() {
        let (svc, _) = make_service(vec![]);

        let err = svc
            .handle(&by_name("nope"), "Switch", Method::Get, b"")
            .await
            .unwrap_err();

        assert!(
            matches!(err, CommandError::NotFound(NotFoundError::Device(name)) if name == "nope")
        );
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_command() {
        let (svc, _) = make_service(vec![device("Switch-1", "Simple-Device")]);

        let err = svc
            .handle(&by_name("Switch-1"), "Dimmer", Method::Get, b"")
            .await
            .unwrap_err();

        assert!(matches!(err, CommandError::NotFound(NotFoundError::Command { .. })));
    }

    #[tokio::test]
    async fn should_check_profile_resource_name_not_device_resource_name() {
        let (svc, _) = make_service(vec![device("Switch-1", "Simple-Device")]);

        let err = svc
            .handle(&by_name("Switch-1"), "SwitchButton", Method::Get, b"")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn should_never_run_pipeline_for_locked_device() {
        let (svc, driver) = make_service(vec![locked(device("Switch-1", "Simple-Device"))]);

        for method in [Method::Get, Method::Set] {
            let err = svc
                .handle(&by_name("Switch-1"), "Switch", method, br#"{"Switch":"1"}"#)
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Locked);
        }
        assert!(driver.reads.lock().unwrap().is_empty());
        assert!(driver.written().is_empty());
    }

    #[tokio::test]
    async fn should_dispatch_to_disabled_device_when_targeted_directly() {
        let (svc, _) = make_service(vec![disabled(device("Switch-1", "Simple-Device"))]);

        let result = svc
            .handle(&by_name("Switch-1"), "Switch", Method::Get, b"")
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn should_return_server_error_when_profile_registry_fails() {
        let (svc, _) = make_service_with(
            vec![device("Switch-1", "Simple-Device")],
            InMemoryProfiles::broken(),
        );

        let err = svc
            .handle(&by_name("Switch-1"), "Switch", Method::Get, b"")
            .await
            .unwrap_err();

        assert!(matches!(err, CommandError::Server(ServerError::CommandLookup { .. })));
    }

    #[tokio::test]
    async fn should_collect_events_from_every_operational_device() {
        let (svc, _) = make_service(vec![
            device("Switch-1", "Simple-Device"),
            device("Switch-2", "Simple-Device"),
            device("Switch-3", "Simple-Device"),
        ]);

        let outcome = svc.handle_all("Switch", Method::Get, b"").await;

        assert!(outcome.error.is_none());
        let mut names: Vec<_> = outcome.events.iter().map(|e| e.device.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, ["Switch-1", "Switch-2", "Switch-3"]);
    }

    #[tokio::test]
    async fn should_skip_locked_and_disabled_devices() {
        let (svc, driver) = make_service(vec![
            device("Switch-1", "Simple-Device"),
            locked(device("Switch-2", "Simple-Device")),
            disabled(device("Switch-3", "Simple-Device")),
        ]);

        let outcome = svc.handle_all("Switch", Method::Get, b"").await;

        assert!(outcome.error.is_none());
        assert_eq!(outcome.events.len(), 1);
        assert_eq!(outcome.events[0].device, "Switch-1");
        assert_eq!(driver.reads.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_drop_error_when_some_devices_succeed() {
        let (svc, _) = make_service(vec![
            device("Switch-1", "Simple-Device"),
            device_at("Switch-2", "Simple-Device", UNREACHABLE),
            device("Switch-3", "Simple-Device"),
        ]);

        let outcome = svc.handle_all("Switch", Method::Get, b"").await;

        assert!(outcome.error.is_none());
        assert_eq!(outcome.events.len(), 2);
    }

    #[tokio::test]
    async fn should_return_error_when_every_device_fails() {
        let (svc, _) = make_service(vec![
            device_at("Switch-1", "Simple-Device", UNREACHABLE),
            device_at("Switch-2", "Simple-Device", UNREACHABLE),
        ]);

        let outcome = svc.handle_all("Switch", Method::Get, b"").await;

        assert!(outcome.events.is_empty());
        let err = outcome.error.unwrap();
        assert!(matches!(err, CommandError::Server(ServerError::Driver { .. })));
    }

    #[tokio::test]
    async fn should_count_panicking_task_as_failure() {
        let (svc, _) = make_service(vec![device_at("Switch-1", "Simple-Device", CRASHING)]);

        let outcome = svc.handle_all("Switch", Method::Get, b"").await;

        assert!(outcome.events.is_empty());
        assert!(matches!(
            outcome.error,
            Some(CommandError::Server(ServerError::Task { ref device, .. })) if device == "Switch-1"
        ));
    }

    #[tokio::test]
    async fn should_survive_panicking_task_next_to_healthy_ones() {
        let (svc, _) = make_service(vec![
            device_at("Switch-1", "Simple-Device", CRASHING),
            device("Switch-2", "Simple-Device"),
        ]);

        let outcome = svc.handle_all("Switch", Method::Get, b"").await;

        assert!(outcome.error.is_none());
        assert_eq!(outcome.events.len(), 1);
    }

    #[tokio::test]
    async fn should_return_nothing_when_no_device_is_eligible() {
        let (svc, _) = make_service(vec![locked(device("Switch-1", "Simple-Device"))]);

        let outcome = svc.handle_all("Switch", Method::Get, b"").await;

        assert!(outcome.events.is_empty());
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn should_fan_out_writes_without_events() {
        let (svc, driver) = make_service(vec![
            device("Switch-1", "Simple-Device"),
            device("Switch-2", "Simple-Device"),
        ]);

        let outcome = svc
            .handle_all("Switch", Method::Set, br#"{"Switch":"false"}"#)
            .await;

        assert!(outcome.error.is_none());
        assert!(outcome.events.is_empty());
        assert_eq!(driver.written().len(), 2);
    }

    #[tokio::test]
    async fn should_report_bad_request_when_every_write_is_rejected() {
        let (svc, _) = make_service(vec![
            device("Switch-1", "Simple-Device"),
            device("Switch-2", "Simple-Device"),
        ]);

        let outcome = svc
            .handle_all("Switch", Method::Set, br#"{"Switch":"NotBoolean"}"#)
            .await;

        assert_eq!(outcome.error.unwrap().kind(), ErrorKind::BadRequest);
    }
}
