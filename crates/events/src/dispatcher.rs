//! Event dispatch: handing a batch of freshly produced events to consumers.
//!
//! A dispatcher receives the events of exactly one transaction, in the order the
//! aggregate produced them, and must deliver them in that order. Consumers that
//! rebuild running totals depend on it (e.g. an item cancellation is always seen
//! before the modification that reflects it).

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

use crate::{Event, EventBus, EventEnvelope, EventHandler};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// A handler rejected an event; later events in the batch were not delivered.
    #[error("handler '{handler}' failed on {event_type}: {message}")]
    Handler {
        handler: &'static str,
        event_type: &'static str,
        message: String,
    },

    /// Publication to a bus failed.
    #[error("event publication failed: {0}")]
    Publish(String),
}

/// Delivers an ordered batch of events.
pub trait EventDispatcher<E: Event>: Send + Sync {
    fn dispatch(&self, events: &[E]) -> Result<(), DispatchError>;
}

impl<E, D> EventDispatcher<E> for Arc<D>
where
    E: Event,
    D: EventDispatcher<E> + ?Sized,
{
    fn dispatch(&self, events: &[E]) -> Result<(), DispatchError> {
        (**self).dispatch(events)
    }
}

/// Two dispatchers in sequence: the first must succeed before the second runs.
impl<E, A, B> EventDispatcher<E> for (A, B)
where
    E: Event,
    A: EventDispatcher<E>,
    B: EventDispatcher<E>,
{
    fn dispatch(&self, events: &[E]) -> Result<(), DispatchError> {
        self.0.dispatch(events)?;
        self.1.dispatch(events)
    }
}

/// In-process dispatcher routing each event to the handlers that declared its kind.
///
/// Events are delivered one at a time in batch order; for each event, handlers run
/// in registration order. The first handler error stops the batch.
pub struct HandlerDispatcher<E: Event> {
    handlers: Vec<Arc<dyn EventHandler<E>>>,
}

impl<E: Event> HandlerDispatcher<E> {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn with_handler(mut self, handler: Arc<dyn EventHandler<E>>) -> Self {
        self.register(handler);
        self
    }

    pub fn register(&mut self, handler: Arc<dyn EventHandler<E>>) {
        self.handlers.push(handler);
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl<E: Event> Default for HandlerDispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> core::fmt::Debug for HandlerDispatcher<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let names: Vec<&'static str> = self.handlers.iter().map(|h| h.name()).collect();
        f.debug_struct("HandlerDispatcher")
            .field("handlers", &names)
            .finish()
    }
}

impl<E: Event> EventDispatcher<E> for HandlerDispatcher<E> {
    fn dispatch(&self, events: &[E]) -> Result<(), DispatchError> {
        for event in events {
            let kind = event.kind();
            for handler in &self.handlers {
                if !handler.accepts().contains(&kind) {
                    continue;
                }

                tracing::debug!(
                    handler = handler.name(),
                    event_type = event.event_type(),
                    "delivering event"
                );

                handler
                    .handle(event)
                    .map_err(|e| DispatchError::Handler {
                        handler: handler.name(),
                        event_type: event.event_type(),
                        message: e.to_string(),
                    })?;
            }
        }

        Ok(())
    }
}

/// Publishes every event, wrapped in an [`EventEnvelope`], onto an [`EventBus`].
#[derive(Debug)]
pub struct BusDispatcher<B> {
    bus: B,
    aggregate_type: String,
    next_sequence: AtomicU64,
}

impl<B> BusDispatcher<B> {
    pub fn new(bus: B, aggregate_type: impl Into<String>) -> Self {
        Self {
            bus,
            aggregate_type: aggregate_type.into(),
            next_sequence: AtomicU64::new(1),
        }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }
}

impl<E, B> EventDispatcher<E> for BusDispatcher<B>
where
    E: Event,
    B: EventBus<EventEnvelope<E>>,
{
    fn dispatch(&self, events: &[E]) -> Result<(), DispatchError> {
        for event in events {
            let sequence_number = self.next_sequence.fetch_add(1, Ordering::SeqCst);
            let envelope =
                EventEnvelope::wrap(event.clone(), self.aggregate_type.as_str(), sequence_number);

            self.bus
                .publish(envelope)
                .map_err(|e| DispatchError::Publish(format!("{e:?}")))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::{DateTime, Utc};
    use retail_core::AggregateId;
    use uuid::Uuid;

    use super::*;
    use crate::{HandlerError, InMemoryEventBus};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum PingKind {
        Ping,
        Pong,
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum PingEvent {
        Ping(u32),
        Pong(u32),
    }

    impl Event for PingEvent {
        type Kind = PingKind;

        fn kind(&self) -> PingKind {
            match self {
                PingEvent::Ping(_) => PingKind::Ping,
                PingEvent::Pong(_) => PingKind::Pong,
            }
        }

        fn event_type(&self) -> &'static str {
            match self {
                PingEvent::Ping(_) => "test.ping",
                PingEvent::Pong(_) => "test.pong",
            }
        }

        fn version(&self) -> u32 {
            1
        }

        fn occurred_at(&self) -> DateTime<Utc> {
            DateTime::<Utc>::UNIX_EPOCH
        }

        fn aggregate_id(&self) -> AggregateId {
            AggregateId::from_uuid(Uuid::nil())
        }
    }

    struct Recorder {
        kinds: &'static [PingKind],
        seen: Mutex<Vec<PingEvent>>,
        fail_on: Option<u32>,
    }

    impl Recorder {
        fn new(kinds: &'static [PingKind]) -> Arc<Self> {
            Arc::new(Self {
                kinds,
                seen: Mutex::new(Vec::new()),
                fail_on: None,
            })
        }

        fn seen(&self) -> Vec<PingEvent> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl EventHandler<PingEvent> for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn accepts(&self) -> &[PingKind] {
            self.kinds
        }

        fn handle(&self, event: &PingEvent) -> Result<(), HandlerError> {
            if let (Some(bad), PingEvent::Ping(n)) = (self.fail_on, event) {
                if *n == bad {
                    return Err(HandlerError::new("boom"));
                }
            }
            self.seen.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    #[test]
    fn handlers_only_receive_declared_kinds_in_order() {
        let pings = Recorder::new(&[PingKind::Ping]);
        let all = Recorder::new(&[PingKind::Ping, PingKind::Pong]);
        let dispatcher = HandlerDispatcher::<PingEvent>::new()
            .with_handler(pings.clone())
            .with_handler(all.clone());

        let batch = vec![PingEvent::Ping(1), PingEvent::Pong(2), PingEvent::Ping(3)];
        dispatcher.dispatch(&batch).unwrap();

        assert_eq!(pings.seen(), vec![PingEvent::Ping(1), PingEvent::Ping(3)]);
        assert_eq!(all.seen(), batch);
    }

    #[test]
    fn handler_failure_stops_the_batch() {
        let failing = Arc::new(Recorder {
            kinds: &[PingKind::Ping],
            seen: Mutex::new(Vec::new()),
            fail_on: Some(2),
        });
        let dispatcher = HandlerDispatcher::<PingEvent>::new().with_handler(failing.clone());

        let err = dispatcher
            .dispatch(&[PingEvent::Ping(1), PingEvent::Ping(2), PingEvent::Ping(3)])
            .unwrap_err();

        assert_eq!(
            err,
            DispatchError::Handler {
                handler: "recorder",
                event_type: "test.ping",
                message: "boom".to_string(),
            }
        );
        assert_eq!(failing.seen(), vec![PingEvent::Ping(1)]);
    }

    #[test]
    fn bus_dispatcher_assigns_increasing_sequence_numbers() {
        let bus: Arc<InMemoryEventBus<EventEnvelope<PingEvent>>> = Arc::new(InMemoryEventBus::new());
        let sub = bus.subscribe();
        let dispatcher = BusDispatcher::new(bus.clone(), "test.pinger");

        dispatcher.dispatch(&[PingEvent::Ping(1)]).unwrap();
        dispatcher.dispatch(&[PingEvent::Pong(2)]).unwrap();

        let received = sub.drain();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].sequence_number(), 1);
        assert_eq!(received[1].sequence_number(), 2);
        assert_eq!(received[1].aggregate_type(), "test.pinger");
        assert_eq!(received[1].payload(), &PingEvent::Pong(2));
    }

    #[test]
    fn paired_dispatchers_run_in_sequence() {
        let first = Recorder::new(&[PingKind::Ping]);
        let second = Recorder::new(&[PingKind::Ping]);
        let pair = (
            HandlerDispatcher::<PingEvent>::new().with_handler(first.clone()),
            HandlerDispatcher::<PingEvent>::new().with_handler(second.clone()),
        );

        pair.dispatch(&[PingEvent::Ping(7)]).unwrap();

        assert_eq!(first.seen(), vec![PingEvent::Ping(7)]);
        assert_eq!(second.seen(), vec![PingEvent::Ping(7)]);
    }
}
