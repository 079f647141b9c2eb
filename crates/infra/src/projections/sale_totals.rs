use std::collections::HashMap;
use std::sync::RwLock;

use rust_decimal::Decimal;

use retail_core::{CustomerId, SaleItemId};
use retail_events::{EventHandler, HandlerError};
use retail_sales::{SaleEvent, SaleEventKind, SaleId};

/// Per-sale running totals, built from events alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleTotalsReadModel {
    pub sale_id: SaleId,
    /// `None` until a `SaleCreated` for this sale has been seen.
    pub sale_number: Option<String>,
    pub customer_id: Option<CustomerId>,
    pub total_amount: Decimal,
    pub cancelled_items: Vec<SaleItemId>,
    pub is_cancelled: bool,
    pub events_applied: u64,
}

impl SaleTotalsReadModel {
    fn empty(sale_id: SaleId) -> Self {
        Self {
            sale_id,
            sale_number: None,
            customer_id: None,
            total_amount: Decimal::ZERO,
            cancelled_items: Vec::new(),
            is_cancelled: false,
            events_applied: 0,
        }
    }
}

/// Projection keeping [`SaleTotalsReadModel`]s current.
///
/// Applies events in delivery order. A sale first seen through a later event
/// (e.g. the projection was attached after the sale was created) gets a
/// partial model that fills in once a `SaleCreated` arrives.
#[derive(Debug, Default)]
pub struct SaleTotalsProjection {
    models: RwLock<HashMap<SaleId, SaleTotalsReadModel>>,
}

impl SaleTotalsProjection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, sale_id: SaleId) -> Option<SaleTotalsReadModel> {
        self.models.read().ok()?.get(&sale_id).cloned()
    }

    /// Sum of totals across all sales that are not cancelled.
    pub fn open_total(&self) -> Decimal {
        self.models
            .read()
            .map(|models| {
                models
                    .values()
                    .filter(|m| !m.is_cancelled)
                    .map(|m| m.total_amount)
                    .sum()
            })
            .unwrap_or(Decimal::ZERO)
    }

    pub fn apply(&self, event: &SaleEvent) -> Result<(), HandlerError> {
        let mut models = self
            .models
            .write()
            .map_err(|_| HandlerError::new("sale totals lock poisoned"))?;

        let model = models
            .entry(event.sale_id())
            .or_insert_with(|| SaleTotalsReadModel::empty(event.sale_id()));

        match event {
            SaleEvent::SaleCreated(e) => {
                model.sale_number = Some(e.sale_number.clone());
                model.customer_id = Some(e.customer_id);
                model.total_amount = e.total_amount;
            }
            SaleEvent::SaleModified(e) => {
                model.total_amount = e.total_amount;
            }
            SaleEvent::ItemCancelled(e) => {
                if !model.cancelled_items.contains(&e.item_id) {
                    model.cancelled_items.push(e.item_id);
                }
            }
            SaleEvent::SaleCancelled(e) => {
                model.sale_number.get_or_insert_with(|| e.sale_number.clone());
                model.total_amount = Decimal::ZERO;
                model.is_cancelled = true;
            }
        }
        model.events_applied += 1;

        Ok(())
    }
}

impl EventHandler<SaleEvent> for SaleTotalsProjection {
    fn name(&self) -> &'static str {
        "sale_totals"
    }

    fn accepts(&self) -> &[SaleEventKind] {
        &SaleEventKind::ALL
    }

    fn handle(&self, event: &SaleEvent) -> Result<(), HandlerError> {
        self.apply(event)
    }
}
