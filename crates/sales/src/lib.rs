//! Sales domain module.
//!
//! This crate contains the business rules for retail sales: the `Sale` aggregate,
//! its line items, the quantity discount tiers and the domain events every state
//! transition produces. It is deterministic domain logic only (no IO, no storage,
//! no logging).

pub mod discount;
pub mod event;
pub mod item;
pub mod record;
pub mod sale;
pub mod snapshot;

pub use discount::{DiscountTier, MAX_UNITS_PER_ITEM};
pub use event::{
    ItemCancelled, SaleCancelled, SaleCreated, SaleEvent, SaleEventKind, SaleModified,
};
pub use item::SaleItem;
pub use record::SaleRecord;
pub use sale::{SALE_AGGREGATE_TYPE, Sale, SaleId, SaleItemView, SaleView};
pub use snapshot::{BranchSnapshot, CustomerSnapshot, ProductSnapshot};
