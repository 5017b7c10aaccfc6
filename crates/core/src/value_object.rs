//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. A price
/// ladder, a tax identifier and a specification value are value objects; a
/// product or an account is an [`Entity`](crate::Entity).
///
/// Constructors of value objects are expected to validate their invariants so
/// that an instance, once built, is always well-formed.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
