//! What the analyzer knows about an expression after checking it.

use ycc_core::TypeId;

/// Where the value of an expression comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueKind {
    /// A computed value.
    #[default]
    Temporary,
    /// A named variable, an indexed element or a member: can be assigned.
    Variable,
    /// A literal constant other than `null`.
    Literal,
    /// The `null` literal, assignable to any reference type.
    Null,
    /// The expression had an error that was already reported.
    Invalid,
}

/// Result of checking one expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExprInfo {
    pub ty: TypeId,
    pub kind: ValueKind,
}

impl ExprInfo {
    pub fn temporary(ty: TypeId) -> Self {
        Self {
            ty,
            kind: ValueKind::Temporary,
        }
    }

    pub fn variable(ty: TypeId) -> Self {
        Self {
            ty,
            kind: ValueKind::Variable,
        }
    }

    pub fn literal(ty: TypeId) -> Self {
        Self {
            ty,
            kind: ValueKind::Literal,
        }
    }

    pub fn null() -> Self {
        Self {
            ty: TypeId::VOID,
            kind: ValueKind::Null,
        }
    }

    /// A poisoned result. Its type is `void` and further checks against it
    /// stay quiet so one mistake is reported once.
    pub fn invalid() -> Self {
        Self {
            ty: TypeId::VOID,
            kind: ValueKind::Invalid,
        }
    }

    #[inline]
    pub fn is_variable(&self) -> bool {
        self.kind == ValueKind::Variable
    }

    #[inline]
    pub fn is_literal(&self) -> bool {
        matches!(self.kind, ValueKind::Literal | ValueKind::Null)
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.kind == ValueKind::Null
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.kind != ValueKind::Invalid
    }
}

/// Context threaded by value through expression checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExprContext {
    /// Checking the initializer of a declaration. Reading a local that has
    /// not been assigned yet is an error here.
    pub initializing: bool,
}

impl ExprContext {
    pub fn initializer() -> Self {
        Self { initializing: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_variables_are_assignable() {
        assert!(ExprInfo::variable(TypeId::INT).is_variable());
        assert!(!ExprInfo::temporary(TypeId::INT).is_variable());
        assert!(!ExprInfo::literal(TypeId::INT).is_variable());
    }

    #[test]
    fn null_is_a_literal_without_a_type() {
        let null = ExprInfo::null();
        assert!(null.is_literal());
        assert!(null.is_null());
        assert_eq!(null.ty, TypeId::VOID);
    }

    #[test]
    fn invalid_results_are_void() {
        let invalid = ExprInfo::invalid();
        assert!(!invalid.is_valid());
        assert_eq!(invalid.ty, TypeId::VOID);
    }
}
