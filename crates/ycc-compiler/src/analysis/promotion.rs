//! Numeric promotion and assignment compatibility.
//!
//! Numeric types are ranked by their registration order:
//! `byte < char < short < int < long < float < double`. A value converts
//! implicitly to any numeric type of equal or higher rank.

use ycc_core::TypeId;
use ycc_registry::TypeRegistry;

use super::expr_info::ExprInfo;

/// Result type of a binary arithmetic operation.
#[inline]
pub fn promote(left: TypeId, right: TypeId) -> TypeId {
    left.max_rank(right)
}

/// Integer types, the only valid operands of bitwise operators, indices
/// and array lengths.
#[inline]
pub fn is_integral(ty: TypeId) -> bool {
    ty.is_numeric() && !ty.is_floating()
}

/// Whether a numeric value of type `from` converts implicitly to `to`.
#[inline]
pub fn widens(from: TypeId, to: TypeId) -> bool {
    from.is_numeric() && to.is_numeric() && from <= to
}

/// Whether `value` may be stored into a location of type `target`.
///
/// Poisoned values are accepted so that their error is not repeated.
pub fn assignable(types: &TypeRegistry, target: TypeId, value: ExprInfo) -> bool {
    if !value.is_valid() || target == value.ty {
        return true;
    }
    if value.is_null() {
        return types.is_reference(target);
    }
    widens(value.ty, target)
}
