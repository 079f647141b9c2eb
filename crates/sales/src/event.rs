use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use retail_core::{AggregateId, CustomerId, ProductId, SaleItemId};
use retail_events::Event;

use crate::sale::SaleId;

/// Event: SaleCreated. The total is always zero at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleCreated {
    pub sale_id: SaleId,
    pub sale_number: String,
    pub customer_id: CustomerId,
    pub total_amount: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SaleModified, carrying the recomputed sale total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleModified {
    pub sale_id: SaleId,
    pub total_amount: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemCancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCancelled {
    pub sale_id: SaleId,
    pub item_id: SaleItemId,
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SaleCancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleCancelled {
    pub sale_id: SaleId,
    pub sale_number: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaleEvent {
    SaleCreated(SaleCreated),
    SaleModified(SaleModified),
    ItemCancelled(ItemCancelled),
    SaleCancelled(SaleCancelled),
}

/// Variant tag of a [`SaleEvent`], used by handlers to declare what they accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaleEventKind {
    SaleCreated,
    SaleModified,
    ItemCancelled,
    SaleCancelled,
}

impl SaleEventKind {
    pub const ALL: [SaleEventKind; 4] = [
        SaleEventKind::SaleCreated,
        SaleEventKind::SaleModified,
        SaleEventKind::ItemCancelled,
        SaleEventKind::SaleCancelled,
    ];
}

impl SaleEvent {
    pub fn sale_id(&self) -> SaleId {
        match self {
            SaleEvent::SaleCreated(e) => e.sale_id,
            SaleEvent::SaleModified(e) => e.sale_id,
            SaleEvent::ItemCancelled(e) => e.sale_id,
            SaleEvent::SaleCancelled(e) => e.sale_id,
        }
    }
}

impl Event for SaleEvent {
    type Kind = SaleEventKind;

    fn kind(&self) -> SaleEventKind {
        match self {
            SaleEvent::SaleCreated(_) => SaleEventKind::SaleCreated,
            SaleEvent::SaleModified(_) => SaleEventKind::SaleModified,
            SaleEvent::ItemCancelled(_) => SaleEventKind::ItemCancelled,
            SaleEvent::SaleCancelled(_) => SaleEventKind::SaleCancelled,
        }
    }

    fn event_type(&self) -> &'static str {
        match self {
            SaleEvent::SaleCreated(_) => "sales.sale.created",
            SaleEvent::SaleModified(_) => "sales.sale.modified",
            SaleEvent::ItemCancelled(_) => "sales.sale.item_cancelled",
            SaleEvent::SaleCancelled(_) => "sales.sale.cancelled",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            SaleEvent::SaleCreated(e) => e.occurred_at,
            SaleEvent::SaleModified(e) => e.occurred_at,
            SaleEvent::ItemCancelled(e) => e.occurred_at,
            SaleEvent::SaleCancelled(e) => e.occurred_at,
        }
    }

    fn aggregate_id(&self) -> AggregateId {
        self.sale_id().0
    }
}
