use core::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use retail_core::{AggregateId, AggregateRoot, DomainError, DomainResult, Entity, SaleItemId};

use crate::discount::DiscountTier;
use crate::event::{ItemCancelled, SaleCancelled, SaleCreated, SaleEvent, SaleModified};
use crate::item::SaleItem;
use crate::record::SaleRecord;
use crate::snapshot::{BranchSnapshot, CustomerSnapshot, ProductSnapshot};

/// Aggregate type name used in event envelopes and logs.
pub const SALE_AGGREGATE_TYPE: &str = "sales.sale";

/// Sale identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaleId(pub AggregateId);

impl SaleId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(AggregateId::new())
    }
}

impl core::fmt::Display for SaleId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for SaleId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<AggregateId>().map(Self)
    }
}

/// Aggregate root: Sale.
///
/// Owns its line items and keeps `total_amount` equal to the sum of the active
/// lines' totals (or zero once the sale is cancelled). Every successful operation
/// appends domain events to an internal buffer; the caller drains that buffer with
/// [`Sale::clear_events`] or [`Sale::take_events`] once the events are delivered.
///
/// Operations validate before they touch state, so a failed call leaves the sale
/// exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sale {
    id: SaleId,
    sale_number: String,
    sale_date: DateTime<Utc>,
    customer: CustomerSnapshot,
    branch: BranchSnapshot,
    items: Vec<SaleItem>,
    total_amount: Decimal,
    is_cancelled: bool,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    version: u64,
    pending_events: Vec<SaleEvent>,
}

impl Sale {
    /// Open a new sale. Emits `SaleCreated` with a zero total.
    pub fn new(
        sale_number: impl Into<String>,
        sale_date: DateTime<Utc>,
        customer: CustomerSnapshot,
        branch: BranchSnapshot,
    ) -> DomainResult<Self> {
        let sale_number = sale_number.into();
        if sale_number.trim().is_empty() {
            return Err(DomainError::invalid_argument("sale number is required"));
        }

        let now = Utc::now();
        let mut sale = Self {
            id: SaleId::generate(),
            sale_number,
            sale_date,
            customer,
            branch,
            items: Vec::new(),
            total_amount: Decimal::ZERO,
            is_cancelled: false,
            created_at: now,
            updated_at: None,
            version: 0,
            pending_events: Vec::new(),
        };

        sale.record(SaleEvent::SaleCreated(SaleCreated {
            sale_id: sale.id,
            sale_number: sale.sale_number.clone(),
            customer_id: sale.customer.id,
            total_amount: Decimal::ZERO,
            occurred_at: now,
        }));

        Ok(sale)
    }

    /// Rebuild a sale from storage, with an empty event buffer.
    ///
    /// Rejects records whose stored total disagrees with their items.
    pub fn restore(record: SaleRecord) -> DomainResult<Self> {
        let sale = Self {
            id: record.id,
            sale_number: record.sale_number,
            sale_date: record.sale_date,
            customer: record.customer,
            branch: record.branch,
            items: record.items,
            total_amount: record.total_amount,
            is_cancelled: record.is_cancelled,
            created_at: record.created_at,
            updated_at: record.updated_at,
            version: record.version,
            pending_events: Vec::new(),
        };

        let expected = if sale.is_cancelled {
            Decimal::ZERO
        } else {
            checked_total(sale.active_items())?
        };
        if sale.total_amount != expected {
            return Err(DomainError::invalid_state(format!(
                "stored total {} of sale {} does not match its items ({expected})",
                sale.total_amount, sale.id
            )));
        }

        Ok(sale)
    }

    /// Persisted form of the current state (pending events excluded).
    pub fn to_record(&self) -> SaleRecord {
        SaleRecord {
            id: self.id,
            sale_number: self.sale_number.clone(),
            sale_date: self.sale_date,
            customer: self.customer.clone(),
            branch: self.branch.clone(),
            items: self.items.clone(),
            total_amount: self.total_amount,
            is_cancelled: self.is_cancelled,
            created_at: self.created_at,
            updated_at: self.updated_at,
            version: self.version,
        }
    }

    pub fn sale_id(&self) -> SaleId {
        self.id
    }

    pub fn sale_number(&self) -> &str {
        &self.sale_number
    }

    pub fn sale_date(&self) -> DateTime<Utc> {
        self.sale_date
    }

    pub fn customer(&self) -> &CustomerSnapshot {
        &self.customer
    }

    pub fn branch(&self) -> &BranchSnapshot {
        &self.branch
    }

    /// All lines in insertion order, cancelled ones included.
    pub fn items(&self) -> &[SaleItem] {
        &self.items
    }

    pub fn active_items(&self) -> impl Iterator<Item = &SaleItem> {
        self.items.iter().filter(|item| !item.is_cancelled())
    }

    pub fn item(&self, item_id: SaleItemId) -> Option<&SaleItem> {
        self.items.iter().find(|item| *item.id() == item_id)
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    pub fn is_cancelled(&self) -> bool {
        self.is_cancelled
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Events produced since the buffer was last cleared, oldest first.
    pub fn pending_events(&self) -> &[SaleEvent] {
        &self.pending_events
    }

    pub fn clear_events(&mut self) {
        self.pending_events.clear();
    }

    /// Drain the event buffer, returning its contents.
    pub fn take_events(&mut self) -> Vec<SaleEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Record the revision assigned by storage after a successful write.
    pub fn mark_persisted(&mut self, version: u64) {
        self.version = version;
    }

    /// Append a line. Emits `SaleModified`.
    pub fn add_item(
        &mut self,
        product: ProductSnapshot,
        quantity: i32,
        unit_price: Decimal,
    ) -> DomainResult<SaleItemId> {
        self.ensure_active("cannot add items to a cancelled sale")?;
        let tier = DiscountTier::for_quantity(quantity)?;

        let item = SaleItem::new(product, quantity, unit_price, tier.rate())?;
        let total = checked_total(self.active_items().chain(core::iter::once(&item)))?;
        let item_id = *item.id();
        self.items.push(item);

        let now = self.apply_total(total);
        self.record_modified(now);

        Ok(item_id)
    }

    /// Logically cancel an active line. Emits `ItemCancelled` then `SaleModified`.
    pub fn remove_item(&mut self, item_id: SaleItemId) -> DomainResult<()> {
        self.ensure_active("cannot remove items from a cancelled sale")?;

        let idx = self
            .items
            .iter()
            .position(|item| *item.id() == item_id && !item.is_cancelled())
            .ok_or_else(|| DomainError::not_found(format!("sale item {item_id}")))?;
        let total = checked_total(self.active_items().filter(|item| *item.id() != item_id))?;

        let item = &mut self.items[idx];
        item.cancel();
        let product_id = item.product().id;

        let now = self.apply_total(total);
        self.record(SaleEvent::ItemCancelled(ItemCancelled {
            sale_id: self.id,
            item_id,
            product_id,
            occurred_at: now,
        }));
        self.record_modified(now);

        Ok(())
    }

    /// Change quantity and price of a line, re-deriving its discount. Emits `SaleModified`.
    pub fn update_item(
        &mut self,
        item_id: SaleItemId,
        new_quantity: i32,
        new_unit_price: Decimal,
    ) -> DomainResult<()> {
        self.ensure_active("cannot update items in a cancelled sale")?;

        let idx = self
            .items
            .iter()
            .position(|item| *item.id() == item_id)
            .ok_or_else(|| DomainError::not_found(format!("sale item {item_id}")))?;
        let tier = DiscountTier::for_quantity(new_quantity)?;

        let mut updated = self.items[idx].clone();
        updated.update(new_quantity, new_unit_price, tier.rate())?;
        let total = checked_total(
            self.active_items()
                .filter(|item| *item.id() != item_id)
                .chain(core::iter::once(&updated)),
        )?;
        self.items[idx] = updated;

        let now = self.apply_total(total);
        self.record_modified(now);

        Ok(())
    }

    /// Cancel the whole sale. Emits `SaleCancelled`.
    ///
    /// Not idempotent: cancelling twice is an error. Lines keep their own state;
    /// only the sale total is forced to zero.
    pub fn cancel(&mut self) -> DomainResult<()> {
        if self.is_cancelled {
            return Err(DomainError::invalid_state("sale is already cancelled"));
        }

        let now = Utc::now();
        self.is_cancelled = true;
        self.total_amount = Decimal::ZERO;
        self.updated_at = Some(now);

        self.record(SaleEvent::SaleCancelled(SaleCancelled {
            sale_id: self.id,
            sale_number: self.sale_number.clone(),
            occurred_at: now,
        }));

        Ok(())
    }

    /// Immutable snapshot for readers.
    pub fn view(&self) -> SaleView {
        SaleView::from(self)
    }

    fn ensure_active(&self, msg: &'static str) -> DomainResult<()> {
        if self.is_cancelled {
            return Err(DomainError::invalid_state(msg));
        }
        Ok(())
    }

    fn apply_total(&mut self, total: Decimal) -> DateTime<Utc> {
        let now = Utc::now();
        self.total_amount = total;
        self.updated_at = Some(now);
        now
    }

    fn record_modified(&mut self, occurred_at: DateTime<Utc>) {
        self.record(SaleEvent::SaleModified(SaleModified {
            sale_id: self.id,
            total_amount: self.total_amount,
            occurred_at,
        }));
    }

    fn record(&mut self, event: SaleEvent) {
        self.pending_events.push(event);
    }
}

fn checked_total<'a>(mut items: impl Iterator<Item = &'a SaleItem>) -> DomainResult<Decimal> {
    items.try_fold(Decimal::ZERO, |total, item| {
        total
            .checked_add(item.total_amount())
            .ok_or_else(|| DomainError::invalid_argument("sale total overflows"))
    })
}

impl AggregateRoot for Sale {
    type Id = SaleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Read-only snapshot of a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleItemView {
    pub id: SaleItemId,
    pub product: ProductSnapshot,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub discount_rate: Decimal,
    pub discount_amount: Decimal,
    pub sub_total: Decimal,
    pub total_amount: Decimal,
    pub is_cancelled: bool,
}

impl From<&SaleItem> for SaleItemView {
    fn from(item: &SaleItem) -> Self {
        Self {
            id: *item.id(),
            product: item.product().clone(),
            quantity: item.quantity(),
            unit_price: item.unit_price(),
            discount_rate: item.discount_rate(),
            discount_amount: item.discount_amount(),
            sub_total: item.sub_total(),
            total_amount: item.total_amount(),
            is_cancelled: item.is_cancelled(),
        }
    }
}

/// Read-only snapshot of a sale handed to callers outside the domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleView {
    pub id: SaleId,
    pub sale_number: String,
    pub sale_date: DateTime<Utc>,
    pub customer: CustomerSnapshot,
    pub branch: BranchSnapshot,
    pub items: Vec<SaleItemView>,
    pub total_amount: Decimal,
    pub is_cancelled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&Sale> for SaleView {
    fn from(sale: &Sale) -> Self {
        Self {
            id: sale.id,
            sale_number: sale.sale_number.clone(),
            sale_date: sale.sale_date,
            customer: sale.customer.clone(),
            branch: sale.branch.clone(),
            items: sale.items.iter().map(SaleItemView::from).collect(),
            total_amount: sale.total_amount,
            is_cancelled: sale.is_cancelled,
            created_at: sale.created_at,
            updated_at: sale.updated_at,
        }
    }
}
