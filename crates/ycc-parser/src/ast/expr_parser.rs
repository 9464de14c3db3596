//! Expression parsing by precedence climbing.

use std::cell::Cell;

use bumpalo::collections::Vec as BVec;
use ycc_core::{ParseError, ParseErrorKind, Span, TypeId};

use super::parser::Parser;
use crate::ast::expr::*;
use crate::ast::ops::{AssignOp, BinaryOp, PostfixOp, UnaryOp};
use crate::lexer::{Token, TokenKind};

/// Binding power shared by postfix operators, calls, indexing and member
/// access.
const POSTFIX_BP: u8 = 27;
const TERNARY_BP: u8 = 2;

impl<'ast, 'env> Parser<'ast, 'env> {
    /// Parse an expression whose operators all bind at least as tightly as
    /// `min_bp`.
    pub(super) fn parse_expr(&mut self, min_bp: u8) -> Result<&'ast Expr<'ast>, ParseError> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let kind = self.peek().kind;

            if let Some(op) = PostfixOp::from_token(kind) {
                if PostfixOp::binding_power() < min_bp {
                    break;
                }
                let token = self.advance();
                lhs = self.alloc_expr(Expr::Postfix(self.arena.alloc(PostfixExpr {
                    op,
                    operand: lhs,
                    span: lhs.span().to(token.span),
                    ty: Cell::new(None),
                })));
                continue;
            }

            match kind {
                TokenKind::Dot if POSTFIX_BP >= min_bp => {
                    lhs = self.parse_member_access(lhs)?;
                    continue;
                }
                TokenKind::LeftBracket if POSTFIX_BP >= min_bp => {
                    lhs = self.parse_index(lhs)?;
                    continue;
                }
                TokenKind::Question if TERNARY_BP >= min_bp => {
                    lhs = self.parse_ternary(lhs)?;
                    continue;
                }
                _ => {}
            }

            if let Some(op) = AssignOp::from_token(kind) {
                let (l_bp, r_bp) = AssignOp::binding_power();
                if l_bp < min_bp {
                    break;
                }
                self.advance();
                let value = self.parse_expr(r_bp)?;
                lhs = self.alloc_expr(Expr::Assign(self.arena.alloc(AssignExpr {
                    target: lhs,
                    op,
                    value,
                    span: lhs.span().to(value.span()),
                    ty: Cell::new(None),
                })));
                continue;
            }

            if let Some(op) = BinaryOp::from_token(kind) {
                let (l_bp, r_bp) = op.binding_power();
                if l_bp < min_bp {
                    break;
                }
                self.advance();
                let right = self.parse_expr(r_bp)?;
                lhs = self.alloc_expr(Expr::Binary(self.arena.alloc(BinaryExpr {
                    left: lhs,
                    op,
                    right,
                    span: lhs.span().to(right.span()),
                    ty: Cell::new(None),
                })));
                continue;
            }

            break;
        }

        Ok(lhs)
    }

    fn alloc_expr(&self, expr: Expr<'ast>) -> &'ast Expr<'ast> {
        self.arena.alloc(expr)
    }

    fn parse_prefix(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let token = *self.peek();

        if let Some(op) = UnaryOp::from_token(token.kind) {
            self.advance();
            if op == UnaryOp::Neg
                && let Some(min) = self.negated_min_literal(token.span)
            {
                return Ok(min);
            }
            let operand = self.parse_expr(UnaryOp::binding_power())?;
            return Ok(self.alloc_expr(Expr::Unary(self.arena.alloc(UnaryExpr {
                op,
                operand,
                span: token.span.to(operand.span()),
                ty: Cell::new(None),
            }))));
        }

        match token.kind {
            TokenKind::IntLiteral => {
                self.advance();
                let (value, is_long) = parse_int(token.lexeme).ok_or_else(|| {
                    ParseError::new(
                        ParseErrorKind::InvalidLiteral,
                        token.span,
                        format!("integer number too large: {}", token.lexeme),
                    )
                })?;
                Ok(self.literal(
                    LiteralKind::Int {
                        value,
                        is_char: false,
                        is_long,
                    },
                    token.span,
                ))
            }
            TokenKind::RealLiteral => {
                self.advance();
                let digits = token.lexeme.trim_end_matches(['f', 'F', 'd', 'D']);
                let value = digits.parse::<f64>().map_err(|_| {
                    ParseError::new(
                        ParseErrorKind::InvalidLiteral,
                        token.span,
                        format!("malformed floating-point literal {}", token.lexeme),
                    )
                })?;
                Ok(self.literal(LiteralKind::Real(value), token.span))
            }
            TokenKind::CharLiteral => {
                self.advance();
                let value = decode_char(token.lexeme).ok_or_else(|| {
                    ParseError::new(
                        ParseErrorKind::InvalidLiteral,
                        token.span,
                        format!("invalid character literal {}", token.lexeme),
                    )
                })?;
                Ok(self.literal(
                    LiteralKind::Int {
                        value,
                        is_char: true,
                        is_long: false,
                    },
                    token.span,
                ))
            }
            TokenKind::StringLiteral => {
                self.advance();
                let inner = &token.lexeme[1..token.lexeme.len() - 1];
                Ok(self.literal(LiteralKind::Str(inner), token.span))
            }
            TokenKind::True | TokenKind::False => {
                self.advance();
                Ok(self.literal(
                    LiteralKind::Bool(token.kind == TokenKind::True),
                    token.span,
                ))
            }
            TokenKind::Null => {
                self.advance();
                Ok(self.literal(LiteralKind::Null, token.span))
            }
            TokenKind::Identifier => self.parse_ident_or_call(),
            TokenKind::New => self.parse_new(),
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_expr(0)?;
                self.expect(TokenKind::RightParen)?;
                Ok(inner)
            }
            TokenKind::Unreserved => Err(Self::already_reported(token.span)),
            _ => Err(ParseError::expected_expression(
                token.span,
                token.kind.description(),
            )),
        }
    }

    /// `-2147483648` and `-9223372036854775808L`, whose magnitude only fits
    /// once negated, become a single literal.
    fn negated_min_literal(&mut self, minus: Span) -> Option<&'ast Expr<'ast>> {
        let token = *self.peek();
        if token.kind != TokenKind::IntLiteral {
            return None;
        }
        let (value, is_long) = match token.lexeme {
            "2147483648" => (i64::from(i32::MIN), false),
            "9223372036854775808L" | "9223372036854775808l" => (i64::MIN, true),
            _ => return None,
        };
        self.advance();
        Some(self.literal(
            LiteralKind::Int {
                value,
                is_char: false,
                is_long,
            },
            minus.to(token.span),
        ))
    }

    fn literal(&self, kind: LiteralKind<'ast>, span: Span) -> &'ast Expr<'ast> {
        self.alloc_expr(Expr::Literal(self.arena.alloc(LiteralExpr {
            kind,
            span,
            ty: Cell::new(None),
            interned: Cell::new(None),
        })))
    }

    /// `name` or `name(args)`.
    fn parse_ident_or_call(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let token = self.advance();
        let ident = Ident::new(token.lexeme, token.span);
        if !self.check(TokenKind::LeftParen) {
            return Ok(self.alloc_expr(Expr::Ident(self.arena.alloc(IdentExpr {
                ident,
                ty: Cell::new(None),
            }))));
        }
        let (args, end) = self.parse_arguments()?;
        Ok(self.alloc_expr(Expr::Call(self.arena.alloc(CallExpr {
            callee: ident,
            args,
            span: token.span.to(end),
            ty: Cell::new(None),
        }))))
    }

    /// `( expr, ... )`, returning the arguments and the closing paren span.
    fn parse_arguments(&mut self) -> Result<(&'ast [&'ast Expr<'ast>], Span), ParseError> {
        self.expect(TokenKind::LeftParen)?;
        let mut args = BVec::new_in(self.arena);
        if !self.check(TokenKind::RightParen) {
            loop {
                args.push(self.parse_expr(0)?);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        let close = self.expect(TokenKind::RightParen)?;
        Ok((args.into_bump_slice(), close.span))
    }

    /// `left.field` or `left.method(args)`.
    fn parse_member_access(
        &mut self,
        left: &'ast Expr<'ast>,
    ) -> Result<&'ast Expr<'ast>, ParseError> {
        self.advance();
        if !self.check(TokenKind::Identifier) {
            let found = *self.peek();
            return Err(ParseError::expected_identifier(
                found.span,
                found.kind.description(),
            ));
        }
        let right = self.parse_ident_or_call()?;
        Ok(self.alloc_expr(Expr::Qualified(self.arena.alloc(QualifiedExpr {
            left,
            right,
            span: left.span().to(right.span()),
            ty: Cell::new(None),
        }))))
    }

    fn parse_index(&mut self, base: &'ast Expr<'ast>) -> Result<&'ast Expr<'ast>, ParseError> {
        self.advance();
        let index = self.parse_expr(0)?;
        let close = self.expect(TokenKind::RightBracket)?;
        Ok(self.alloc_expr(Expr::Index(self.arena.alloc(IndexExpr {
            base,
            index,
            span: base.span().to(close.span),
            ty: Cell::new(None),
        }))))
    }

    /// `cond ? a : b`, right-associative.
    fn parse_ternary(&mut self, cond: &'ast Expr<'ast>) -> Result<&'ast Expr<'ast>, ParseError> {
        self.advance();
        let then_expr = self.parse_expr(0)?;
        self.expect(TokenKind::Colon)?;
        let else_expr = self.parse_expr(TERNARY_BP)?;
        Ok(self.alloc_expr(Expr::Ternary(self.arena.alloc(TernaryExpr {
            cond,
            then_expr,
            else_expr,
            span: cond.span().to(else_expr.span()),
            ty: Cell::new(None),
        }))))
    }

    /// `new Name(args)` or `new Type[length]`.
    fn parse_new(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let start = self.advance().span;
        let token = *self.peek();
        let base = if token.kind.is_primitive_type() {
            self.advance();
            self.env.type_id(token.lexeme).unwrap_or(TypeId::VOID)
        } else if token.kind == TokenKind::Identifier {
            self.advance();
            self.resolve_type_name(token.lexeme)
        } else {
            return Err(ParseError::new(
                ParseErrorKind::ExpectedType,
                token.span,
                format!("<identifier> expected after new, found {}", token.kind),
            ));
        };
        let type_name = Ident::new(token.lexeme, token.span);

        let (length, args, end) = if self.eat(TokenKind::LeftBracket).is_some() {
            let length = self.parse_expr(0)?;
            let close = self.expect(TokenKind::RightBracket)?;
            self.env.array_of(base);
            (Some(length), &[][..], close.span)
        } else if self.check(TokenKind::LeftParen) {
            let (args, end) = self.parse_arguments()?;
            (None, args, end)
        } else {
            let found = *self.peek();
            return Err(ParseError::expected_token(
                found.span,
                "'(' or '['",
                found.kind.description(),
            ));
        };

        Ok(self.alloc_expr(Expr::New(self.arena.alloc(NewExpr {
            type_name,
            base,
            length,
            args,
            span: start.to(end),
            ty: Cell::new(None),
        }))))
    }

    /// An initializer: an expression, or `{...}` for arrays.
    pub(super) fn parse_initializer(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let Some(open) = self.eat(TokenKind::LeftBrace) else {
            return self.parse_expr(0);
        };
        let mut elements = BVec::new_in(self.arena);
        while !self.check(TokenKind::RightBrace) {
            elements.push(self.parse_initializer()?);
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        let close: Token<'ast> = self.expect(TokenKind::RightBrace)?;
        Ok(self.alloc_expr(Expr::Array(self.arena.alloc(ArrayExpr {
            elements: elements.into_bump_slice(),
            span: open.span.to(close.span),
            ty: Cell::new(None),
        }))))
    }
}

/// Value of an integer literal and whether it carries an `L` suffix.
///
/// Decimal literals must fit the signed range of their type. Hexadecimal
/// (`0x`) and octal (leading `0`) literals may use the full unsigned range
/// and wrap into the signed one, so `0xFFFFFFFF` is `-1`.
fn parse_int(lexeme: &str) -> Option<(i64, bool)> {
    let is_long = lexeme.ends_with(['l', 'L']);
    let digits = lexeme.trim_end_matches(['l', 'L']);
    let radix = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .map(|hex| (hex, 16))
        .or_else(|| (digits.len() > 1 && digits.starts_with('0')).then(|| (&digits[1..], 8)));

    let value = match radix {
        Some((body, radix)) => {
            let raw = u64::from_str_radix(body, radix).ok()?;
            if is_long {
                raw as i64
            } else {
                i64::from(u32::try_from(raw).ok()? as i32)
            }
        }
        None => {
            let value = digits.parse::<i64>().ok()?;
            if !is_long && i32::try_from(value).is_err() {
                return None;
            }
            value
        }
    };
    Some((value, is_long))
}

/// Code point of a character literal, quotes included in `lexeme`.
fn decode_char(lexeme: &str) -> Option<i64> {
    let inner = lexeme.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut chars = inner.chars();
    let first = chars.next()?;
    if first != '\\' {
        return Some(first as i64);
    }
    let escaped = chars.next()?;
    let value = match escaped {
        'n' => '\n' as i64,
        't' => '\t' as i64,
        'r' => '\r' as i64,
        'b' => 0x08,
        'f' => 0x0C,
        '0'..='7' => {
            let octal: String = std::iter::once(escaped).chain(chars).collect();
            return i64::from_str_radix(&octal, 8).ok();
        }
        other => other as i64,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;
    use ycc_registry::ScopeEnvironment;

    use super::{decode_char, parse_int};
    use crate::Parser;
    use crate::ast::*;

    fn expr<'a>(source: &str, arena: &'a Bump) -> &'a Expr<'a> {
        let mut env = ScopeEnvironment::new();
        let text = format!("class T {{ void m() {{ {source}; }} }}");
        let program = Parser::parse(&text, arena, &mut env).unwrap();
        let Stmt::Class(class) = program.items[0] else {
            panic!("expected class");
        };
        let Stmt::Method(method) = class.body[0] else {
            panic!("expected method");
        };
        let Stmt::Expr(stmt) = method.body.unwrap().stmts[0] else {
            panic!("expected expression statement");
        };
        stmt.expr
    }

    #[test]
    fn multiplication_binds_tighter() {
        let arena = Bump::new();
        let Expr::Binary(add) = *expr("a + b * c", &arena) else {
            panic!("expected binary");
        };
        assert_eq!(add.op, BinaryOp::Add);
        assert!(matches!(add.right, Expr::Binary(mul) if mul.op == BinaryOp::Mul));
    }

    #[test]
    fn binary_operators_are_left_associative() {
        let arena = Bump::new();
        let Expr::Binary(outer) = *expr("a - b - c", &arena) else {
            panic!("expected binary");
        };
        assert!(matches!(outer.left, Expr::Binary(inner) if inner.op == BinaryOp::Sub));
        assert!(matches!(outer.right, Expr::Ident(_)));
    }

    #[test]
    fn assignment_is_right_associative() {
        let arena = Bump::new();
        let Expr::Assign(outer) = *expr("a = b += 1", &arena) else {
            panic!("expected assignment");
        };
        assert_eq!(outer.op, AssignOp::Assign);
        assert!(matches!(outer.value, Expr::Assign(inner) if inner.op == AssignOp::Add));
    }

    #[test]
    fn ternary_sits_between_assignment_and_or() {
        let arena = Bump::new();
        let Expr::Assign(assign) = *expr("x = a || b ? 1 : 2", &arena) else {
            panic!("expected assignment");
        };
        let Expr::Ternary(ternary) = *assign.value else {
            panic!("expected ternary");
        };
        assert!(matches!(ternary.cond, Expr::Binary(or) if or.op == BinaryOp::LogicalOr));
    }

    #[test]
    fn postfix_call_index_and_member() {
        let arena = Bump::new();
        let Expr::Qualified(q) = *expr("Util.max(a[i++], 2)", &arena) else {
            panic!("expected qualified access");
        };
        let Expr::Call(call) = *q.right else {
            panic!("expected call");
        };
        assert_eq!(call.callee.name, "max");
        assert_eq!(call.args.len(), 2);
        let Expr::Index(index) = *call.args[0] else {
            panic!("expected index");
        };
        assert!(matches!(index.index, Expr::Postfix(_)));
    }

    #[test]
    fn prefix_operators_bind_tighter_than_binary() {
        let arena = Bump::new();
        let Expr::Binary(bin) = *expr("-a * !b", &arena) else {
            panic!("expected binary");
        };
        assert!(matches!(bin.left, Expr::Unary(u) if u.op == UnaryOp::Neg));
        assert!(matches!(bin.right, Expr::Unary(u) if u.op == UnaryOp::Not));
    }

    #[test]
    fn new_array_and_object() {
        let arena = Bump::new();
        let Expr::New(array) = *expr("new int[10]", &arena) else {
            panic!("expected new");
        };
        assert!(array.length.is_some());
        let Expr::New(object) = *expr("new Point(1, 2)", &arena) else {
            panic!("expected new");
        };
        assert_eq!(object.type_name.name, "Point");
        assert_eq!(object.args.len(), 2);
    }

    #[test]
    fn string_literal_keeps_source_escapes() {
        let arena = Bump::new();
        let Expr::Literal(lit) = *expr(r#""a\n""#, &arena) else {
            panic!("expected literal");
        };
        assert_eq!(lit.kind, LiteralKind::Str(r"a\n"));
    }

    #[test]
    fn integer_literal_forms() {
        assert_eq!(parse_int("42"), Some((42, false)));
        assert_eq!(parse_int("0x1F"), Some((31, false)));
        assert_eq!(parse_int("010"), Some((8, false)));
        assert_eq!(parse_int("5000000000L"), Some((5_000_000_000, true)));
        assert_eq!(parse_int("5000000000"), None);
    }

    #[test]
    fn decimal_ints_stay_in_the_signed_range() {
        assert_eq!(parse_int("2147483647"), Some((i64::from(i32::MAX), false)));
        assert_eq!(parse_int("3000000000"), None);
        assert_eq!(parse_int("2147483648"), None);
        assert_eq!(parse_int("9223372036854775807L"), Some((i64::MAX, true)));
    }

    #[test]
    fn hex_and_octal_ints_wrap_into_the_signed_range() {
        assert_eq!(parse_int("0xFFFFFFFF"), Some((-1, false)));
        assert_eq!(parse_int("037777777777"), Some((-1, false)));
        assert_eq!(parse_int("0x80000000"), Some((i64::from(i32::MIN), false)));
        assert_eq!(parse_int("0x100000000"), None);
        assert_eq!(parse_int("0xFFFFFFFFFFFFFFFFL"), Some((-1, true)));
    }

    #[test]
    fn negated_minimum_is_one_literal() {
        let arena = Bump::new();
        let Expr::Assign(assign) = *expr("x = -2147483648", &arena) else {
            panic!("expected assignment");
        };
        let Expr::Literal(lit) = *assign.value else {
            panic!("expected literal");
        };
        assert_eq!(
            lit.kind,
            LiteralKind::Int {
                value: i64::from(i32::MIN),
                is_char: false,
                is_long: false,
            }
        );
        assert_eq!(lit.span.col, assign.value.span().col);
    }

    #[test]
    fn character_literals_decode_escapes() {
        assert_eq!(decode_char("'A'"), Some(65));
        assert_eq!(decode_char(r"'\n'"), Some(10));
        assert_eq!(decode_char(r"'\''"), Some(39));
        assert_eq!(decode_char(r"'\101'"), Some(65));
    }
}
