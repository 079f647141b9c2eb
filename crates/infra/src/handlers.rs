//! Built-in sale event handlers.
//!
//! All three only observe: they log and never reject an event unless it
//! cannot be serialized.

use std::sync::Arc;

use retail_events::{Event, EventHandler, HandlerDispatcher, HandlerError};
use retail_sales::{SaleEvent, SaleEventKind};

/// Logs every sale event with its JSON payload.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingEventHandler;

impl EventHandler<SaleEvent> for LoggingEventHandler {
    fn name(&self) -> &'static str {
        "logging"
    }

    fn accepts(&self) -> &[SaleEventKind] {
        &SaleEventKind::ALL
    }

    fn handle(&self, event: &SaleEvent) -> Result<(), HandlerError> {
        let payload = serde_json::to_string(event)
            .map_err(|e| HandlerError::new(format!("payload serialization failed: {e}")))?;

        tracing::info!(
            event_type = event.event_type(),
            sale_id = %event.sale_id(),
            occurred_at = %event.occurred_at(),
            payload = %payload,
            "sale event"
        );
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SaleCreatedHandler;

impl EventHandler<SaleEvent> for SaleCreatedHandler {
    fn name(&self) -> &'static str {
        "sale_created"
    }

    fn accepts(&self) -> &[SaleEventKind] {
        &[SaleEventKind::SaleCreated]
    }

    fn handle(&self, event: &SaleEvent) -> Result<(), HandlerError> {
        if let SaleEvent::SaleCreated(e) = event {
            tracing::info!(
                sale_id = %e.sale_id,
                sale_number = %e.sale_number,
                customer_id = %e.customer_id,
                total_amount = %e.total_amount,
                "new sale created"
            );
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SaleCancelledHandler;

impl EventHandler<SaleEvent> for SaleCancelledHandler {
    fn name(&self) -> &'static str {
        "sale_cancelled"
    }

    fn accepts(&self) -> &[SaleEventKind] {
        &[SaleEventKind::SaleCancelled]
    }

    fn handle(&self, event: &SaleEvent) -> Result<(), HandlerError> {
        if let SaleEvent::SaleCancelled(e) = event {
            tracing::warn!(
                sale_id = %e.sale_id,
                sale_number = %e.sale_number,
                cancelled_at = %e.occurred_at,
                "sale cancelled"
            );
        }
        Ok(())
    }
}

/// Dispatcher preloaded with the logging, created and cancelled handlers.
pub fn standard_handlers() -> HandlerDispatcher<SaleEvent> {
    HandlerDispatcher::<SaleEvent>::new()
        .with_handler(Arc::new(LoggingEventHandler))
        .with_handler(Arc::new(SaleCreatedHandler))
        .with_handler(Arc::new(SaleCancelledHandler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use retail_core::CustomerId;
    use retail_events::EventDispatcher;
    use retail_sales::{SaleCancelled, SaleCreated, SaleId};
    use rust_decimal::Decimal;

    #[test]
    fn handlers_declare_the_kinds_they_observe() {
        assert_eq!(LoggingEventHandler.accepts(), &SaleEventKind::ALL);
        assert_eq!(SaleCreatedHandler.accepts(), &[SaleEventKind::SaleCreated]);
        assert_eq!(SaleCancelledHandler.accepts(), &[SaleEventKind::SaleCancelled]);
    }

    #[test]
    fn standard_handlers_accept_a_full_lifecycle() {
        let sale_id = SaleId::generate();
        let events = vec![
            SaleEvent::SaleCreated(SaleCreated {
                sale_id,
                sale_number: "S-1".into(),
                customer_id: CustomerId::new(),
                total_amount: Decimal::ZERO,
                occurred_at: Utc::now(),
            }),
            SaleEvent::SaleCancelled(SaleCancelled {
                sale_id,
                sale_number: "S-1".into(),
                occurred_at: Utc::now(),
            }),
        ];

        let dispatcher = standard_handlers();
        assert_eq!(dispatcher.handler_count(), 3);
        assert_eq!(dispatcher.dispatch(&events), Ok(()));
    }
}
