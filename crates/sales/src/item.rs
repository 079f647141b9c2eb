use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use retail_core::{DomainError, DomainResult, Entity, SaleItemId};

use crate::snapshot::ProductSnapshot;

/// One line of a sale.
///
/// Amounts are derived: `sub_total = quantity × unit_price`,
/// `discount_amount = sub_total × discount_rate`,
/// `total_amount = sub_total − discount_amount`. A cancelled line keeps its
/// quantity and price as history, but its `total_amount` is zero and it can no
/// longer be updated.
///
/// Quantity bounds and the discount rate are decided by the owning [`Sale`];
/// the line itself stores whatever it is given, as long as the amounts fit in a
/// `Decimal`.
///
/// [`Sale`]: crate::Sale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleItem {
    id: SaleItemId,
    product: ProductSnapshot,
    quantity: i32,
    unit_price: Decimal,
    discount_rate: Decimal,
    discount_amount: Decimal,
    sub_total: Decimal,
    total_amount: Decimal,
    is_cancelled: bool,
}

impl SaleItem {
    pub fn new(
        product: ProductSnapshot,
        quantity: i32,
        unit_price: Decimal,
        discount_rate: Decimal,
    ) -> DomainResult<Self> {
        let amounts = LineAmounts::derive(quantity, unit_price, discount_rate)?;
        Ok(Self {
            id: SaleItemId::new(),
            product,
            quantity,
            unit_price,
            discount_rate,
            discount_amount: amounts.discount_amount,
            sub_total: amounts.sub_total,
            total_amount: amounts.total_amount,
            is_cancelled: false,
        })
    }

    pub fn product(&self) -> &ProductSnapshot {
        &self.product
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn discount_rate(&self) -> Decimal {
        self.discount_rate
    }

    pub fn discount_amount(&self) -> Decimal {
        self.discount_amount
    }

    pub fn sub_total(&self) -> Decimal {
        self.sub_total
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    pub fn is_cancelled(&self) -> bool {
        self.is_cancelled
    }

    /// Replace quantity, price and rate, then recompute the amounts.
    ///
    /// Nothing changes when the line is cancelled or the new amounts overflow.
    pub fn update(
        &mut self,
        quantity: i32,
        unit_price: Decimal,
        discount_rate: Decimal,
    ) -> DomainResult<()> {
        if self.is_cancelled {
            return Err(DomainError::invalid_state("cannot update a cancelled item"));
        }

        let amounts = LineAmounts::derive(quantity, unit_price, discount_rate)?;
        self.quantity = quantity;
        self.unit_price = unit_price;
        self.discount_rate = discount_rate;
        self.sub_total = amounts.sub_total;
        self.discount_amount = amounts.discount_amount;
        self.total_amount = amounts.total_amount;
        Ok(())
    }

    /// Logically cancel the line. Cancelling twice leaves the line unchanged.
    pub fn cancel(&mut self) {
        self.is_cancelled = true;
        self.total_amount = Decimal::ZERO;
    }

}

struct LineAmounts {
    sub_total: Decimal,
    discount_amount: Decimal,
    total_amount: Decimal,
}

impl LineAmounts {
    fn derive(quantity: i32, unit_price: Decimal, discount_rate: Decimal) -> DomainResult<Self> {
        let overflow = || DomainError::invalid_argument("line amount overflows");

        let sub_total = Decimal::from(quantity)
            .checked_mul(unit_price)
            .ok_or_else(overflow)?;
        let discount_amount = sub_total.checked_mul(discount_rate).ok_or_else(overflow)?;
        let total_amount = sub_total
            .checked_sub(discount_amount)
            .ok_or_else(overflow)?;

        Ok(Self {
            sub_total,
            discount_amount,
            total_amount,
        })
    }
}

impl Entity for SaleItem {
    type Id = SaleItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
