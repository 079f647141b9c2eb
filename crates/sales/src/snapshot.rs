//! Denormalized snapshots captured on a sale.
//!
//! Customers, branches and products are owned by other systems. A sale copies the
//! descriptive fields it needs at the moment it is recorded and never refreshes them.

use serde::{Deserialize, Serialize};

use retail_core::{BranchId, CustomerId, ProductId, ValueObject};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSnapshot {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    /// Tax/registration document number.
    pub document: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchSnapshot {
    pub id: BranchId,
    pub name: String,
    pub address: String,
    pub city: String,
    /// Two-letter state code.
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub sku: String,
}

impl ValueObject for CustomerSnapshot {}
impl ValueObject for BranchSnapshot {}
impl ValueObject for ProductSnapshot {}
