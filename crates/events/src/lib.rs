//! Domain event mechanics: the `Event` contract, handlers, dispatch and pub/sub.
//!
//! Domain crates define their own event enums; this crate only knows how to
//! route them. Nothing here performs IO beyond in-process channels.

pub mod bus;
pub mod dispatcher;
pub mod envelope;
pub mod event;
pub mod handler;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use dispatcher::{BusDispatcher, DispatchError, EventDispatcher, HandlerDispatcher};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use handler::{EventHandler, HandlerError};
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
