//! Quantity-based discount tiers.
//!
//! | units  | rate |
//! |--------|------|
//! | 1–3    | 0%   |
//! | 4–9    | 10%  |
//! | 10–20  | 20%  |
//!
//! The tier depends only on the quantity of a single line; quantities of other
//! lines in the same sale never contribute.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use retail_core::{DomainError, DomainResult};

/// Maximum number of identical units a single line may carry.
pub const MAX_UNITS_PER_ITEM: i32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountTier {
    /// 1–3 units.
    None,
    /// 4–9 units.
    Standard,
    /// 10–20 units.
    Bulk,
}

impl DiscountTier {
    /// Resolve the tier for a line quantity.
    ///
    /// Non-positive quantities are malformed input; quantities above
    /// [`MAX_UNITS_PER_ITEM`] break the sales policy.
    pub fn for_quantity(quantity: i32) -> DomainResult<Self> {
        if quantity <= 0 {
            return Err(DomainError::invalid_argument(
                "quantity must be greater than zero",
            ));
        }
        if quantity > MAX_UNITS_PER_ITEM {
            return Err(DomainError::invalid_state(format!(
                "cannot sell more than {MAX_UNITS_PER_ITEM} identical items"
            )));
        }

        Ok(match quantity {
            10.. => DiscountTier::Bulk,
            4.. => DiscountTier::Standard,
            _ => DiscountTier::None,
        })
    }

    /// Discount as a fraction of the line subtotal.
    pub fn rate(self) -> Decimal {
        match self {
            DiscountTier::None => Decimal::ZERO,
            DiscountTier::Standard => Decimal::new(10, 2),
            DiscountTier::Bulk => Decimal::new(20, 2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn tier_boundaries() {
        assert_eq!(DiscountTier::for_quantity(1).unwrap(), DiscountTier::None);
        assert_eq!(DiscountTier::for_quantity(3).unwrap(), DiscountTier::None);
        assert_eq!(DiscountTier::for_quantity(4).unwrap(), DiscountTier::Standard);
        assert_eq!(DiscountTier::for_quantity(9).unwrap(), DiscountTier::Standard);
        assert_eq!(DiscountTier::for_quantity(10).unwrap(), DiscountTier::Bulk);
        assert_eq!(DiscountTier::for_quantity(20).unwrap(), DiscountTier::Bulk);
    }

    #[test]
    fn rates() {
        assert_eq!(DiscountTier::None.rate(), dec!(0));
        assert_eq!(DiscountTier::Standard.rate(), dec!(0.10));
        assert_eq!(DiscountTier::Bulk.rate(), dec!(0.20));
    }

    #[test]
    fn non_positive_quantity_is_an_invalid_argument() {
        assert!(matches!(
            DiscountTier::for_quantity(0),
            Err(DomainError::InvalidArgument(_))
        ));
        assert!(matches!(
            DiscountTier::for_quantity(-5),
            Err(DomainError::InvalidArgument(_))
        ));
    }

    #[test]
    fn quantity_above_cap_is_an_invalid_state() {
        assert!(matches!(
            DiscountTier::for_quantity(21),
            Err(DomainError::InvalidState(msg)) if msg.contains("20")
        ));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 512,
                ..ProptestConfig::default()
            })]

            /// Property: every quantity maps to exactly the rate of its tier.
            #[test]
            fn rate_follows_quantity_table(quantity in -50i32..=50) {
                let resolved = DiscountTier::for_quantity(quantity);
                match quantity {
                    q if q <= 0 => prop_assert!(matches!(resolved, Err(DomainError::InvalidArgument(_)))),
                    1..=3 => prop_assert_eq!(resolved.unwrap().rate(), dec!(0)),
                    4..=9 => prop_assert_eq!(resolved.unwrap().rate(), dec!(0.10)),
                    10..=20 => prop_assert_eq!(resolved.unwrap().rate(), dec!(0.20)),
                    _ => prop_assert!(matches!(resolved, Err(DomainError::InvalidState(_)))),
                }
            }
        }
    }
}
