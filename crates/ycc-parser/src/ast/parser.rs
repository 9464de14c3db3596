//! Parser state and token-stream helpers.
//!
//! The parser tokenizes eagerly, then walks the token buffer by recursive
//! descent. Statement and member lists recover from errors locally, so one
//! malformed statement does not hide the errors after it.

use bumpalo::Bump;
use bumpalo::collections::Vec as BVec;
use tracing::debug;
use ycc_core::{ParseError, ParseErrorKind, ParseErrors, Span};
use ycc_registry::ScopeEnvironment;

use crate::ast::Program;
use crate::ast::stmt::Stmt;
use crate::lexer::{Lexer, Token, TokenKind};

/// Recursive-descent parser over a fully scanned token buffer.
///
/// Class and method declarations are entered into the [`ScopeEnvironment`]
/// as they are parsed, and every type written in source is resolved (or
/// registered) against its type registry.
pub struct Parser<'ast, 'env> {
    tokens: Vec<Token<'ast>>,
    position: usize,
    errors: ParseErrors,
    pub(super) arena: &'ast Bump,
    pub(super) env: &'env mut ScopeEnvironment,
    /// Names of the classes being parsed, innermost last.
    pub(super) classes: Vec<&'ast str>,
}

impl<'ast, 'env> Parser<'ast, 'env> {
    fn new(source: &str, arena: &'ast Bump, env: &'env mut ScopeEnvironment) -> Self {
        let (tokens, lex_errors) = Lexer::new(source, arena).tokenize();
        let mut errors = ParseErrors::new();
        for error in lex_errors {
            errors.push(error.into());
        }
        Self {
            tokens,
            position: 0,
            errors,
            arena,
            env,
            classes: Vec::new(),
        }
    }

    /// Parse a compilation unit.
    ///
    /// Returns the program only if neither the scanner nor the parser
    /// reported an error.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse(
        source: &str,
        arena: &'ast Bump,
        env: &'env mut ScopeEnvironment,
    ) -> Result<Program<'ast>, ParseErrors> {
        let mut parser = Parser::new(source, arena, env);
        let program = parser.parse_program();
        debug!(
            items = program.items.len(),
            errors = parser.errors.len(),
            "parsed compilation unit"
        );
        if parser.errors.is_empty() {
            Ok(program)
        } else {
            Err(parser.errors)
        }
    }

    /// Parse the whole unit, collecting errors instead of stopping.
    ///
    /// Only class declarations (and stray semicolons) are allowed at the
    /// top level.
    fn parse_program(&mut self) -> Program<'ast> {
        let start = self.peek().span;
        let mut items = BVec::new_in(self.arena);

        while !self.is_at_end() {
            if self.eat(TokenKind::Semicolon).is_some() {
                continue;
            }
            let before = self.position;
            let result = if self.is_class_start() {
                self.parse_class()
            } else {
                let token = *self.peek();
                Err(ParseError::new(
                    ParseErrorKind::UnexpectedToken,
                    token.span,
                    format!("class expected, found {}", token.kind),
                ))
            };
            match result {
                Ok(stmt) => items.push(stmt),
                Err(error) => self.recover(error, before),
            }
        }

        let end = self.peek().span;
        Program::new(items.into_bump_slice(), start.to(end))
    }

    /// Whether the upcoming tokens are `modifier* class`.
    pub(super) fn is_class_start(&self) -> bool {
        let mut n = 0;
        while self.peek_nth(n).kind.is_modifier() {
            n += 1;
        }
        self.peek_nth(n).kind == TokenKind::Class
    }

    // ========================================================================
    // Token buffer
    // ========================================================================

    /// The current token. The buffer always ends with `Eof`, which is
    /// returned for any position past the end.
    pub(super) fn peek(&self) -> &Token<'ast> {
        self.peek_nth(0)
    }

    pub(super) fn peek_nth(&self, n: usize) -> &Token<'ast> {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.position + n).min(last)]
    }

    pub(super) fn previous(&self) -> Option<&Token<'ast>> {
        self.position.checked_sub(1).map(|i| &self.tokens[i])
    }

    pub(super) fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    /// Consume the current token. `Eof` is never consumed.
    pub(super) fn advance(&mut self) -> Token<'ast> {
        let token = *self.peek();
        if token.kind != TokenKind::Eof {
            self.position += 1;
        }
        token
    }

    pub(super) fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(super) fn eat(&mut self, kind: TokenKind) -> Option<Token<'ast>> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    pub(super) fn expect(&mut self, kind: TokenKind) -> Result<Token<'ast>, ParseError> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        let found = *self.peek();
        if found.kind == TokenKind::Unreserved {
            return Err(Self::already_reported(found.span));
        }
        Err(ParseError::expected_token(
            found.span,
            kind.description(),
            found.kind.description(),
        ))
    }

    pub(super) fn expect_ident(&mut self) -> Result<Token<'ast>, ParseError> {
        if self.check(TokenKind::Identifier) {
            return Ok(self.advance());
        }
        let found = *self.peek();
        if found.kind == TokenKind::Unreserved {
            return Err(Self::already_reported(found.span));
        }
        Err(ParseError::expected_identifier(
            found.span,
            found.kind.description(),
        ))
    }

    /// An error for a token the scanner already complained about.
    pub(super) fn already_reported(span: Span) -> ParseError {
        ParseError::new(ParseErrorKind::Lexical, span, String::new())
    }

    pub(super) fn alloc_str(&self, text: &str) -> &'ast str {
        self.arena.alloc_str(text)
    }

    // ========================================================================
    // Error recovery
    // ========================================================================

    pub(super) fn report(&mut self, error: ParseError) {
        if error.kind != ParseErrorKind::Lexical {
            self.errors.push(error);
        }
    }

    /// Record `error` and skip to a plausible restart point, guaranteeing
    /// progress past `before`.
    pub(super) fn recover(&mut self, error: ParseError, before: usize) {
        self.report(error);
        if self.position == before {
            self.advance();
        }
        self.synchronize();
    }

    /// Skip tokens until just after a `;` or just before a token that can
    /// start a statement or member.
    fn synchronize(&mut self) {
        use TokenKind::*;
        while !self.is_at_end() {
            if self.previous().is_some_and(|t| t.kind == Semicolon) {
                return;
            }
            let kind = self.peek().kind;
            if kind.is_modifier() || kind.is_primitive_type() {
                return;
            }
            match kind {
                RightBrace | Class | If | For | While | Do | Switch | Return | Break
                | Continue => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Parse statements until `}` or end of input, recovering per
    /// statement.
    pub(super) fn parse_statement_list(
        &mut self,
        mut parse: impl FnMut(&mut Self) -> Result<Stmt<'ast>, ParseError>,
        stop: &[TokenKind],
    ) -> &'ast [Stmt<'ast>] {
        let mut stmts = BVec::new_in(self.arena);
        while !self.is_at_end() && !stop.contains(&self.peek().kind) {
            let before = self.position;
            match parse(self) {
                Ok(stmt) => stmts.push(stmt),
                Err(error) => self.recover(error, before),
            }
        }
        stmts.into_bump_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_errors(source: &str) -> Vec<String> {
        let arena = Bump::new();
        let mut env = ScopeEnvironment::new();
        match Parser::parse(source, &arena, &mut env) {
            Ok(_) => Vec::new(),
            Err(errors) => errors.iter().map(|e| format!("{}: {}", e.span, e.message)).collect(),
        }
    }

    #[test]
    fn empty_unit_parses() {
        assert!(parse_errors("").is_empty());
        assert!(parse_errors(";;").is_empty());
    }

    #[test]
    fn only_classes_at_top_level() {
        let errors = parse_errors("int x;");
        assert_eq!(errors[0], "1:1: class expected, found 'int'");
    }

    #[test]
    fn recovers_after_a_bad_statement() {
        let errors = parse_errors(
            "class A {\n  void f() {\n    int = 3;\n    x = ;\n    return;\n  }\n}",
        );
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("3:9:"), "{errors:?}");
        assert!(errors[1].starts_with("4:9:"), "{errors:?}");
    }

    #[test]
    fn lexer_errors_are_reported_once() {
        let errors = parse_errors("class A { void f() { int x = #; } }");
        assert_eq!(errors, vec!["1:30: unexpected character '#'".to_string()]);
    }
}
