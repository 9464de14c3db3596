//! Stable handles into the type registry.

use std::fmt;

/// Handle of a registered type.
///
/// Ids are issued in registration order and never reused, so a `TypeId`
/// stays valid for the whole compilation. The numeric value doubles as
/// the promotion rank of the numeric built-ins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(u32);

impl TypeId {
    pub const VOID: TypeId = TypeId(0);
    pub const BOOLEAN: TypeId = TypeId(1);
    pub const BYTE: TypeId = TypeId(2);
    pub const CHAR: TypeId = TypeId(3);
    pub const SHORT: TypeId = TypeId(4);
    pub const INT: TypeId = TypeId(5);
    pub const LONG: TypeId = TypeId(6);
    pub const FLOAT: TypeId = TypeId(7);
    pub const DOUBLE: TypeId = TypeId(8);
    pub const STRING: TypeId = TypeId(9);

    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Whether this is one of the seven numeric built-ins.
    #[inline]
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            TypeId::BYTE
                | TypeId::CHAR
                | TypeId::SHORT
                | TypeId::INT
                | TypeId::LONG
                | TypeId::FLOAT
                | TypeId::DOUBLE
        )
    }

    #[inline]
    pub fn is_floating(self) -> bool {
        matches!(self, TypeId::FLOAT | TypeId::DOUBLE)
    }

    /// The wider of two types by registration rank.
    #[inline]
    pub fn max_rank(self, other: TypeId) -> TypeId {
        if other.0 > self.0 { other } else { self }
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type#{}", self.0)
    }
}

impl From<u32> for TypeId {
    fn from(index: u32) -> Self {
        Self::new(index)
    }
}

impl From<TypeId> for u32 {
    fn from(id: TypeId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NUMERIC: [TypeId; 7] = [
        TypeId::BYTE,
        TypeId::CHAR,
        TypeId::SHORT,
        TypeId::INT,
        TypeId::LONG,
        TypeId::FLOAT,
        TypeId::DOUBLE,
    ];

    #[test]
    fn max_rank_is_symmetric_and_picks_an_operand() {
        for a in NUMERIC {
            for b in NUMERIC {
                let m = a.max_rank(b);
                assert_eq!(m, b.max_rank(a));
                assert!(m == a || m == b);
            }
        }
    }

    #[test]
    fn wider_numeric_wins() {
        assert_eq!(TypeId::INT.max_rank(TypeId::DOUBLE), TypeId::DOUBLE);
        assert_eq!(TypeId::SHORT.max_rank(TypeId::INT), TypeId::INT);
        assert_eq!(TypeId::LONG.max_rank(TypeId::BYTE), TypeId::LONG);
    }

    #[test]
    fn only_numeric_builtins_are_numeric() {
        assert!(NUMERIC.iter().all(|t| t.is_numeric()));
        assert!(!TypeId::VOID.is_numeric());
        assert!(!TypeId::BOOLEAN.is_numeric());
        assert!(!TypeId::STRING.is_numeric());
        assert!(!TypeId::new(42).is_numeric());
    }
}
