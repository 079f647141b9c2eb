//! Inbound request shapes accepted by the workflow.
//!
//! These are plain data; nothing here is trusted until it has passed the
//! validators in [`crate::validation`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use retail_core::{BranchId, CustomerId};
use retail_sales::{BranchSnapshot, CustomerSnapshot, ProductSnapshot};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSaleItemRequest {
    pub product: ProductSnapshot,
    pub quantity: i32,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSaleRequest {
    pub sale_number: String,
    pub sale_date: DateTime<Utc>,
    pub customer: CustomerSnapshot,
    pub branch: BranchSnapshot,
    pub items: Vec<CreateSaleItemRequest>,
}

/// Replaces every active line of a sale with `items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSaleRequest {
    pub items: Vec<CreateSaleItemRequest>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSaleItemRequest {
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Query filters. Only one selector applies, in order: customer, branch, date
/// range (both ends required); `is_cancelled` narrows whatever was selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleFilters {
    pub customer_id: Option<CustomerId>,
    pub branch_id: Option<BranchId>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_cancelled: Option<bool>,
}
