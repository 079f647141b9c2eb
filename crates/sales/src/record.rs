use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::item::SaleItem;
use crate::sale::SaleId;
use crate::snapshot::{BranchSnapshot, CustomerSnapshot};

/// Persisted form of a [`Sale`](crate::Sale).
///
/// Carries the full aggregate state plus the storage revision. Pending domain
/// events are deliberately absent: they belong to the transaction that produced
/// them, not to the stored sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub id: SaleId,
    pub sale_number: String,
    pub sale_date: DateTime<Utc>,
    pub customer: CustomerSnapshot,
    pub branch: BranchSnapshot,
    pub items: Vec<SaleItem>,
    pub total_amount: Decimal,
    pub is_cancelled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: u64,
}
