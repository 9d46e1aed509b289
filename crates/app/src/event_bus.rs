//! In-process event bus backed by a tokio broadcast channel.
//!
//! The bus is the default [`EventSink`]: read events fan out to every
//! subscriber in publication order. A subscriber that falls more than
//! `capacity` events behind loses the oldest ones.

use std::future::Future;

use tokio::sync::broadcast;

use edgecmd_domain::error::BoxError;
use edgecmd_domain::event::Event;

use crate::ports::EventSink;

/// Event sink handing read events to in-process subscribers.
pub struct InProcessEventBus {
    sender: broadcast::Sender<Event>,
}

impl InProcessEventBus {
    /// Create a bus buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Receive every event published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}

impl EventSink for InProcessEventBus {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), BoxError>> + Send {
        match self.sender.send(event) {
            Ok(receivers) => tracing::trace!(receivers, "event published"),
            Err(broadcast::error::SendError(event)) => tracing::debug!(
                device = %event.device,
                readings = event.readings.len(),
                "no subscriber, event dropped"
            ),
        }
        async { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgecmd_domain::event::Reading;
    use edgecmd_domain::profile::ResourceOperation;
    use edgecmd_domain::value::{CommandValue, Value};
    use tokio::sync::broadcast::error::RecvError;

    fn reading(device: &str, resource: &str, value: Value) -> Reading {
        let value = CommandValue::new(ResourceOperation::new(resource), 1_700_000_000_000, value);
        Reading::from_command_value(&value, device)
    }

    fn thermostat_event() -> Event {
        Event::new(
            "Thermostat-1",
            vec![
                reading("Thermostat-1", "Temperature", Value::Float64(21.5)),
                reading("Thermostat-1", "Mode", Value::String("Heat".to_string())),
            ],
        )
    }

    #[tokio::test]
    async fn should_deliver_readings_unchanged() {
        let bus = InProcessEventBus::new(16);
        let mut rx = bus.subscribe();
        let event = thermostat_event();

        bus.publish(event.clone()).await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received, event);
        let values: Vec<_> = received.readings.iter().map(|r| r.value.as_str()).collect();
        assert_eq!(values, ["21.5", "Heat"]);
    }

    #[tokio::test]
    async fn should_deliver_every_event_to_every_subscriber_in_order() {
        let bus = InProcessEventBus::new(16);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        let switch = Event::new(
            "Switch-1",
            vec![reading("Switch-1", "SwitchButton", Value::Bool(true))],
        );
        let thermostat = thermostat_event();
        bus.publish(switch.clone()).await.unwrap();
        bus.publish(thermostat.clone()).await.unwrap();

        for rx in [&mut first, &mut second] {
            assert_eq!(rx.recv().await.unwrap().id, switch.id);
            assert_eq!(rx.recv().await.unwrap().id, thermostat.id);
        }
    }

    #[tokio::test]
    async fn should_accept_events_without_subscribers() {
        let bus = InProcessEventBus::new(16);
        assert!(bus.publish(thermostat_event()).await.is_ok());

        let mut rx = bus.subscribe();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn should_drop_oldest_events_for_slow_subscriber() {
        let bus = InProcessEventBus::new(1);
        let mut rx = bus.subscribe();

        bus.publish(Event::new("Switch-1", vec![])).await.unwrap();
        let latest = thermostat_event();
        bus.publish(latest.clone()).await.unwrap();

        assert!(matches!(rx.recv().await, Err(RecvError::Lagged(1))));
        assert_eq!(rx.recv().await.unwrap(), latest);
    }
}
