use thiserror::Error;

use crate::Event;

/// Failure reported by an event handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HandlerError(String);

impl HandlerError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Reacts to domain events (notification, logging, read models, integration).
///
/// A handler declares up front which event kinds it accepts; the dispatcher
/// matches each event's tag against that list and never offers a handler an
/// event it did not ask for.
///
/// Handlers run after the aggregate has been persisted. They must not assume
/// exactly-once delivery: a failed dispatch may be retried with the same batch.
pub trait EventHandler<E: Event>: Send + Sync {
    /// Short, stable handler name (used in errors and logs).
    fn name(&self) -> &'static str;

    /// Event kinds this handler wants to receive.
    fn accepts(&self) -> &[E::Kind];

    fn handle(&self, event: &E) -> Result<(), HandlerError>;
}
