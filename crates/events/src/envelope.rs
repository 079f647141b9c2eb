use serde::{Deserialize, Serialize};
use uuid::Uuid;

use retail_core::AggregateId;

use crate::Event;

/// Envelope for an event, carrying stream metadata for publication.
///
/// - `sequence_number` increases monotonically per publisher, so subscribers can
///   detect gaps and duplicates.
/// - `payload` is the typed domain event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,

    aggregate_id: AggregateId,
    aggregate_type: String,

    /// Monotonically increasing position in the published stream.
    sequence_number: u64,

    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        event_id: Uuid,
        aggregate_id: AggregateId,
        aggregate_type: impl Into<String>,
        sequence_number: u64,
        payload: E,
    ) -> Self {
        Self {
            event_id,
            aggregate_id,
            aggregate_type: aggregate_type.into(),
            sequence_number,
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn aggregate_id(&self) -> AggregateId {
        self.aggregate_id
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}

impl<E: Event> EventEnvelope<E> {
    /// Wrap a domain event under a fresh UUIDv7, addressed to the event's own aggregate.
    pub fn wrap(event: E, aggregate_type: impl Into<String>, sequence_number: u64) -> Self {
        Self::new(
            Uuid::now_v7(),
            event.aggregate_id(),
            aggregate_type,
            sequence_number,
            event,
        )
    }

    pub fn event_type(&self) -> &'static str {
        self.payload.event_type()
    }
}
