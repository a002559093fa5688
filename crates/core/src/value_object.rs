//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values (a price of
/// `10.50` equals any other price of `10.50`). To "modify" one, build a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
