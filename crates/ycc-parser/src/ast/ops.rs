//! Operators and their binding powers.
//!
//! Binding powers, loosest to tightest: assignment, ternary, `||`, `&&`,
//! `|`, `^`, `&`, equality, relational, shift, additive, multiplicative,
//! prefix, postfix. Binary operators are left-associative, assignment and
//! the ternary operator are right-associative.

use std::fmt;

use crate::lexer::TokenKind;

/// How the analyzer types a binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCategory {
    Logical,
    Comparison,
    Arithmetic,
    Bitwise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    LogicalOr,
    LogicalAnd,
    BitOr,
    BitXor,
    BitAnd,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    ShiftLeft,
    ShiftRight,
    ShiftRightUnsigned,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    /// `(left, right)` binding power; `right > left` makes it left-associative.
    pub fn binding_power(self) -> (u8, u8) {
        use BinaryOp::*;
        match self {
            LogicalOr => (3, 4),
            LogicalAnd => (5, 6),
            BitOr => (7, 8),
            BitXor => (9, 10),
            BitAnd => (11, 12),
            Equal | NotEqual => (13, 14),
            Less | LessEqual | Greater | GreaterEqual => (15, 16),
            ShiftLeft | ShiftRight | ShiftRightUnsigned => (17, 18),
            Add | Sub => (19, 20),
            Mul | Div | Rem => (21, 22),
        }
    }

    pub fn from_token(kind: TokenKind) -> Option<Self> {
        use TokenKind::*;
        Some(match kind {
            PipePipe => BinaryOp::LogicalOr,
            AmpAmp => BinaryOp::LogicalAnd,
            Pipe => BinaryOp::BitOr,
            Caret => BinaryOp::BitXor,
            Amp => BinaryOp::BitAnd,
            EqualEqual => BinaryOp::Equal,
            BangEqual => BinaryOp::NotEqual,
            Less => BinaryOp::Less,
            LessEqual => BinaryOp::LessEqual,
            Greater => BinaryOp::Greater,
            GreaterEqual => BinaryOp::GreaterEqual,
            LessLess => BinaryOp::ShiftLeft,
            GreaterGreater => BinaryOp::ShiftRight,
            GreaterGreaterGreater => BinaryOp::ShiftRightUnsigned,
            Plus => BinaryOp::Add,
            Minus => BinaryOp::Sub,
            Star => BinaryOp::Mul,
            Slash => BinaryOp::Div,
            Percent => BinaryOp::Rem,
            _ => return None,
        })
    }

    pub fn category(self) -> OpCategory {
        use BinaryOp::*;
        match self {
            LogicalOr | LogicalAnd => OpCategory::Logical,
            Equal | NotEqual | Less | LessEqual | Greater | GreaterEqual => OpCategory::Comparison,
            Add | Sub | Mul | Div | Rem => OpCategory::Arithmetic,
            BitOr | BitXor | BitAnd | ShiftLeft | ShiftRight | ShiftRightUnsigned => {
                OpCategory::Bitwise
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        use BinaryOp::*;
        match self {
            LogicalOr => "||",
            LogicalAnd => "&&",
            BitOr => "|",
            BitXor => "^",
            BitAnd => "&",
            Equal => "==",
            NotEqual => "!=",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
            ShiftLeft => "<<",
            ShiftRight => ">>",
            ShiftRightUnsigned => ">>>",
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Rem => "%",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    ShiftLeft,
    ShiftRight,
    ShiftRightUnsigned,
}

impl AssignOp {
    /// Right-associative: `a = b = c` parses as `a = (b = c)`.
    pub fn binding_power() -> (u8, u8) {
        (1, 1)
    }

    pub fn from_token(kind: TokenKind) -> Option<Self> {
        use TokenKind::*;
        Some(match kind {
            Assign => AssignOp::Assign,
            PlusEqual => AssignOp::Add,
            MinusEqual => AssignOp::Sub,
            StarEqual => AssignOp::Mul,
            SlashEqual => AssignOp::Div,
            PercentEqual => AssignOp::Rem,
            AmpEqual => AssignOp::And,
            PipeEqual => AssignOp::Or,
            CaretEqual => AssignOp::Xor,
            LessLessEqual => AssignOp::ShiftLeft,
            GreaterGreaterEqual => AssignOp::ShiftRight,
            GreaterGreaterGreaterEqual => AssignOp::ShiftRightUnsigned,
            _ => return None,
        })
    }

    /// The arithmetic a compound assignment performs, `None` for `=`.
    pub fn binary_op(self) -> Option<BinaryOp> {
        Some(match self {
            AssignOp::Assign => return None,
            AssignOp::Add => BinaryOp::Add,
            AssignOp::Sub => BinaryOp::Sub,
            AssignOp::Mul => BinaryOp::Mul,
            AssignOp::Div => BinaryOp::Div,
            AssignOp::Rem => BinaryOp::Rem,
            AssignOp::And => BinaryOp::BitAnd,
            AssignOp::Or => BinaryOp::BitOr,
            AssignOp::Xor => BinaryOp::BitXor,
            AssignOp::ShiftLeft => BinaryOp::ShiftLeft,
            AssignOp::ShiftRight => BinaryOp::ShiftRight,
            AssignOp::ShiftRightUnsigned => BinaryOp::ShiftRightUnsigned,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self.binary_op() {
            None => "=",
            Some(BinaryOp::Add) => "+=",
            Some(BinaryOp::Sub) => "-=",
            Some(BinaryOp::Mul) => "*=",
            Some(BinaryOp::Div) => "/=",
            Some(BinaryOp::Rem) => "%=",
            Some(BinaryOp::BitAnd) => "&=",
            Some(BinaryOp::BitOr) => "|=",
            Some(BinaryOp::BitXor) => "^=",
            Some(BinaryOp::ShiftLeft) => "<<=",
            Some(BinaryOp::ShiftRight) => ">>=",
            Some(_) => ">>>=",
        }
    }
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
    PreInc,
    PreDec,
}

impl UnaryOp {
    pub fn binding_power() -> u8 {
        25
    }

    pub fn from_token(kind: TokenKind) -> Option<Self> {
        use TokenKind::*;
        Some(match kind {
            Minus => UnaryOp::Neg,
            Plus => UnaryOp::Plus,
            Bang => UnaryOp::Not,
            Tilde => UnaryOp::BitNot,
            PlusPlus => UnaryOp::PreInc,
            MinusMinus => UnaryOp::PreDec,
            _ => return None,
        })
    }

    pub fn is_increment(self) -> bool {
        matches!(self, UnaryOp::PreInc | UnaryOp::PreDec)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::PreInc => "++",
            UnaryOp::PreDec => "--",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostfixOp {
    PostInc,
    PostDec,
}

impl PostfixOp {
    pub fn binding_power() -> u8 {
        27
    }

    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::PlusPlus => Some(PostfixOp::PostInc),
            TokenKind::MinusMinus => Some(PostfixOp::PostDec),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PostfixOp::PostInc => "++",
            PostfixOp::PostDec => "--",
        }
    }
}

impl fmt::Display for PostfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplicative_binds_tighter_than_additive() {
        let (_, add_right) = BinaryOp::Add.binding_power();
        let (mul_left, _) = BinaryOp::Mul.binding_power();
        assert!(mul_left > add_right);
    }

    #[test]
    fn compound_assignment_maps_to_arithmetic() {
        assert_eq!(AssignOp::Add.binary_op(), Some(BinaryOp::Add));
        assert_eq!(AssignOp::Assign.binary_op(), None);
        assert_eq!(AssignOp::ShiftRightUnsigned.as_str(), ">>>=");
        assert_eq!(AssignOp::Xor.as_str(), "^=");
    }

    #[test]
    fn categories() {
        assert_eq!(BinaryOp::LessEqual.category(), OpCategory::Comparison);
        assert_eq!(BinaryOp::LogicalAnd.category(), OpCategory::Logical);
        assert_eq!(BinaryOp::ShiftLeft.category(), OpCategory::Bitwise);
        assert_eq!(BinaryOp::Rem.category(), OpCategory::Arithmetic);
    }
}
