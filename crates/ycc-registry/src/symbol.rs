//! Symbol and method entries stored in scopes.

use ycc_core::{SymbolFlags, TypeId};

/// A declared name: variable, member, parameter or class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolInfo {
    pub ty: TypeId,
    pub flags: SymbolFlags,
    /// Declared length for `T x[n]`-style declarations.
    pub array_size: Option<u32>,
    /// Dotted name built from the enclosing scopes when the symbol is
    /// inserted. Empty until then.
    pub qualified_name: String,
}

impl SymbolInfo {
    /// A symbol of type `ty`; the qualified name is filled in on declaration.
    pub fn new(ty: TypeId, flags: SymbolFlags) -> Self {
        Self {
            ty,
            flags,
            array_size: None,
            qualified_name: String::new(),
        }
    }

    /// Record the length of a fixed-size array declarator.
    pub fn with_array_size(mut self, size: Option<u32>) -> Self {
        self.array_size = size;
        self
    }

    /// Declared `static`.
    #[inline]
    pub fn is_static(&self) -> bool {
        self.flags.is_static()
    }

    /// Declared without a value and not assigned yet.
    #[inline]
    pub fn is_undefined(&self) -> bool {
        self.flags.is_undefined()
    }

    /// A method parameter.
    #[inline]
    pub fn is_parameter(&self) -> bool {
        self.flags.contains(SymbolFlags::PARAMETER)
    }

    /// A class field, static or not.
    #[inline]
    pub fn is_member(&self) -> bool {
        self.flags.contains(SymbolFlags::MEMBER)
    }
}

/// One formal parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub ty: TypeId,
    pub name: String,
}

/// A method: its own symbol (whose type is the return type) plus the
/// ordered parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    pub symbol: SymbolInfo,
    pub params: Vec<Parameter>,
}

impl MethodInfo {
    /// A method without parameters.
    pub fn new(return_type: TypeId, modifiers: SymbolFlags) -> Self {
        Self {
            symbol: SymbolInfo::new(return_type, modifiers | SymbolFlags::METHOD),
            params: Vec::new(),
        }
    }

    /// Builder form of [`push_param`](Self::push_param).
    pub fn with_param(mut self, ty: TypeId, name: impl Into<String>) -> Self {
        self.push_param(ty, name);
        self
    }

    /// Append a parameter.
    pub fn push_param(&mut self, ty: TypeId, name: impl Into<String>) {
        self.params.push(Parameter {
            ty,
            name: name.into(),
        });
    }

    /// Declared result type; `void` for constructors.
    #[inline]
    pub fn return_type(&self) -> TypeId {
        self.symbol.ty
    }

    /// Number of parameters.
    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Symbol the method is defined under, e.g. `Outer.Inner.m`.
    pub fn qualified_name(&self) -> &str {
        &self.symbol.qualified_name
    }

    /// Type of the parameter at `pos`.
    pub fn param_type(&self, pos: usize) -> Option<TypeId> {
        self.params.get(pos).map(|p| p.ty)
    }

    /// Whether the parameter at `pos` has exactly type `ty`.
    pub fn check_parameter(&self, ty: TypeId, pos: usize) -> bool {
        self.param_type(pos) == Some(ty)
    }

    /// Whether `args` match the parameter list exactly, position by position.
    pub fn check_arguments(&self, args: &[TypeId]) -> bool {
        args.len() == self.params.len()
            && args
                .iter()
                .enumerate()
                .all(|(pos, ty)| self.check_parameter(*ty, pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_symbol_carries_return_type_and_kind() {
        let method = MethodInfo::new(TypeId::INT, SymbolFlags::PUBLIC | SymbolFlags::STATIC);
        assert_eq!(method.return_type(), TypeId::INT);
        assert!(method.symbol.flags.contains(SymbolFlags::METHOD));
        assert!(method.symbol.is_static());
    }

    #[test]
    fn parameters_are_checked_by_position() {
        let method = MethodInfo::new(TypeId::VOID, SymbolFlags::empty())
            .with_param(TypeId::INT, "a")
            .with_param(TypeId::DOUBLE, "b");

        assert!(method.check_parameter(TypeId::INT, 0));
        assert!(!method.check_parameter(TypeId::INT, 1));
        assert!(!method.check_parameter(TypeId::INT, 2));
        assert!(method.check_arguments(&[TypeId::INT, TypeId::DOUBLE]));
        assert!(!method.check_arguments(&[TypeId::INT]));
        assert!(!method.check_arguments(&[TypeId::DOUBLE, TypeId::INT]));
    }
}
