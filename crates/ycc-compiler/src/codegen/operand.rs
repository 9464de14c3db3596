//! Values and storage locations as they appear in IR text.

use std::fmt;

use ycc_core::TypeId;

/// An instruction operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// A numbered temporary, `%N`.
    Reg(u32),
    /// A constant written inline, such as `42`, `true` or `null`.
    Const(String),
}

impl Operand {
    pub fn constant(text: impl Into<String>) -> Self {
        Operand::Const(text.into())
    }

    pub fn is_const(&self) -> bool {
        matches!(self, Operand::Const(_))
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Reg(n) => write!(f, "%{n}"),
            Operand::Const(text) => f.write_str(text),
        }
    }
}

/// Where a value is stored: a stack slot (`%x`), a module global
/// (`@A.x`) or a computed element address (`%N`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Place {
    pub ptr: String,
    pub ty: TypeId,
}

impl Place {
    pub fn new(ptr: impl Into<String>, ty: TypeId) -> Self {
        Self {
            ptr: ptr.into(),
            ty,
        }
    }
}

/// Spell a floating constant so the IR reader accepts it: always with a
/// decimal point, and in hex form when it is not finite.
pub fn real_constant(value: f64) -> String {
    if !value.is_finite() {
        return format!("0x{:016X}", value.to_bits());
    }
    let text = format!("{value:?}");
    match text.find(['e', 'E']) {
        Some(pos) if !text[..pos].contains('.') => {
            format!("{}.0{}", &text[..pos], &text[pos..])
        }
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_and_constants_render_inline() {
        assert_eq!(Operand::Reg(7).to_string(), "%7");
        assert_eq!(Operand::constant("null").to_string(), "null");
    }

    #[test]
    fn real_constants_always_have_a_point() {
        assert_eq!(real_constant(1.0), "1.0");
        assert_eq!(real_constant(2.5), "2.5");
        assert_eq!(real_constant(1e300), "1.0e300");
        assert_eq!(real_constant(f64::INFINITY), "0x7FF0000000000000");
    }
}
