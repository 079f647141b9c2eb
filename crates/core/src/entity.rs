//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Entities living inside an aggregate (e.g. sale line items) are only unique
/// within their owning root.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
