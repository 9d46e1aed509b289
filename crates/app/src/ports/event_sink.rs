//! Where read events go after a command.

use std::future::Future;

use edgecmd_domain::error::BoxError;
use edgecmd_domain::event::Event;

/// Receives the events produced by read commands.
pub trait EventSink {
    /// Hand an event downstream.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), BoxError>> + Send;
}

impl<T: EventSink + Send + Sync> EventSink for std::sync::Arc<T> {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), BoxError>> + Send {
        (**self).publish(event)
    }
}
