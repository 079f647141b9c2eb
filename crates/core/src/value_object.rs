//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. In the sales domain
/// the customer, branch and product snapshots captured on a sale are value objects:
/// they carry an upstream identifier, but the sale never re-fetches or mutates them,
/// so two snapshots with the same fields are interchangeable.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
