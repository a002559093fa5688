//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Reference data such as units of measure and product categories are entities:
/// two units with the same symbol but different ids are different units.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
