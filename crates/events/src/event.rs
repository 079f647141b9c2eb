use chrono::{DateTime, Utc};

use retail_core::AggregateId;

/// A domain event.
///
/// Events are:
/// - **immutable** (treat them as facts)
/// - **versioned** (schema evolution)
/// - **tagged**: every event exposes a closed `Kind` so consumers can route on
///   the variant instead of inspecting types at runtime
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Closed set of variant tags for this event family.
    type Kind: Copy + Eq + core::fmt::Debug + Send + Sync + 'static;

    /// Tag of this particular event.
    fn kind(&self) -> Self::Kind;

    /// Stable event name/type identifier (e.g. "sales.sale.created").
    fn event_type(&self) -> &'static str;

    /// Schema version for this event type.
    fn version(&self) -> u32;

    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Aggregate that produced the event.
    fn aggregate_id(&self) -> AggregateId;
}
