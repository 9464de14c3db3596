//! Scanner turning source text into [`Token`]s.
//!
//! Dispatch is on the first character of each token. Lexemes are copied
//! into the arena. Malformed input produces an `Unreserved` token and a
//! recorded [`LexError`]; scanning always continues to end of file.

use bumpalo::Bump;
use ycc_core::{LexError, Span};

use super::cursor::{Cursor, is_ident_continue, is_ident_start};
use super::token::{Token, TokenKind, lookup_keyword};

pub struct Lexer<'src, 'ast> {
    cursor: Cursor<'src>,
    arena: &'ast Bump,
    errors: Vec<LexError>,
}

/// Where the token being scanned started.
#[derive(Clone, Copy)]
struct Start {
    line: u32,
    col: u32,
    offset: u32,
}

impl<'src, 'ast> Lexer<'src, 'ast> {
    pub fn new(source: &'src str, arena: &'ast Bump) -> Self {
        Self {
            cursor: Cursor::new(source),
            arena,
            errors: Vec::new(),
        }
    }

    pub fn take_errors(&mut self) -> Vec<LexError> {
        std::mem::take(&mut self.errors)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Scan the whole input, ending with a single `Eof` token.
    pub fn tokenize(mut self) -> (Vec<Token<'ast>>, Vec<LexError>) {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        (tokens, self.errors)
    }

    pub fn next_token(&mut self) -> Token<'ast> {
        loop {
            self.skip_whitespace();
            let start = Start {
                line: self.cursor.line(),
                col: self.cursor.column(),
                offset: self.cursor.offset(),
            };
            let Some(c) = self.cursor.peek() else {
                return Token::new(TokenKind::Eof, "", Span::point(start.line, start.col));
            };

            if c == '/' && self.skip_comment(start) {
                continue;
            }

            return match c {
                '"' => self.scan_string(start),
                '\'' => self.scan_char(start),
                c if c.is_ascii_digit() => self.scan_number(start),
                '.' if self.cursor.peek_nth(1).is_some_and(|d| d.is_ascii_digit()) => {
                    self.scan_number(start)
                }
                c if is_ident_start(c) => self.scan_identifier(start),
                _ => self.scan_operator(start),
            };
        }
    }

    fn skip_whitespace(&mut self) {
        self.cursor.eat_while(|c| c.is_whitespace());
    }

    /// Skip a `//` or `/* */` comment. Returns false when the slash is an
    /// operator.
    fn skip_comment(&mut self, start: Start) -> bool {
        match self.cursor.peek_nth(1) {
            Some('/') => {
                self.cursor.eat_while(|c| c != '\n');
                true
            }
            Some('*') => {
                self.cursor.advance();
                self.cursor.advance();
                loop {
                    match self.cursor.advance() {
                        None => {
                            let len = self.cursor.offset() - start.offset;
                            self.errors.push(LexError::UnterminatedComment {
                                span: Span::new(start.line, start.col, len),
                            });
                            return true;
                        }
                        Some('*') if self.cursor.eat('/') => return true,
                        Some(_) => {}
                    }
                }
            }
            _ => false,
        }
    }

    fn make_token(&self, kind: TokenKind, start: Start) -> Token<'ast> {
        let lexeme = self.arena.alloc_str(self.cursor.slice_from(start.offset));
        let span = Span::new(start.line, start.col, self.cursor.offset() - start.offset);
        Token::new(kind, lexeme, span)
    }

    fn make_error(&mut self, error: LexError, start: Start) -> Token<'ast> {
        self.errors.push(error);
        self.make_token(TokenKind::Unreserved, start)
    }

    fn span_from(&self, start: Start) -> Span {
        Span::new(start.line, start.col, self.cursor.offset() - start.offset)
    }

    // =========================================
    // Literals
    // =========================================

    fn scan_string(&mut self, start: Start) -> Token<'ast> {
        self.cursor.advance();
        loop {
            match self.cursor.peek() {
                None | Some('\n') => {
                    let span = self.span_from(start);
                    return self.make_error(LexError::UnterminatedString { span }, start);
                }
                Some('"') => {
                    self.cursor.advance();
                    return self.make_token(TokenKind::StringLiteral, start);
                }
                Some('\\') => {
                    if let Err(error) = self.scan_escape() {
                        self.errors.push(error);
                    }
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    fn scan_char(&mut self, start: Start) -> Token<'ast> {
        self.cursor.advance();
        match self.cursor.peek() {
            Some('\\') => {
                if let Err(error) = self.scan_escape() {
                    self.errors.push(error);
                }
            }
            Some('\'') | Some('\n') | None => {
                let span = self.span_from(start);
                return self.make_error(LexError::UnterminatedChar { span }, start);
            }
            Some(_) => {
                self.cursor.advance();
            }
        }
        if self.cursor.eat('\'') {
            self.make_token(TokenKind::CharLiteral, start)
        } else {
            let span = self.span_from(start);
            self.make_error(LexError::UnterminatedChar { span }, start)
        }
    }

    /// Consume a backslash escape inside a string or char literal.
    fn scan_escape(&mut self) -> Result<(), LexError> {
        let line = self.cursor.line();
        let col = self.cursor.column();
        self.cursor.advance();
        match self.cursor.peek() {
            Some('n' | 't' | 'r' | 'b' | 'f' | '"' | '\'' | '\\') => {
                self.cursor.advance();
                Ok(())
            }
            Some('0'..='7') => {
                self.cursor.advance();
                for _ in 0..2 {
                    if !self.cursor.check(|c| ('0'..='7').contains(&c)) {
                        break;
                    }
                    self.cursor.advance();
                }
                Ok(())
            }
            Some(ch) => {
                self.cursor.advance();
                Err(LexError::InvalidEscape {
                    ch,
                    span: Span::new(line, col, 2),
                })
            }
            None => Ok(()),
        }
    }

    fn scan_number(&mut self, start: Start) -> Token<'ast> {
        if self.cursor.peek() == Some('0') && matches!(self.cursor.peek_nth(1), Some('x' | 'X')) {
            self.cursor.advance();
            self.cursor.advance();
            let digits = self.cursor.eat_while(|c| c.is_ascii_hexdigit());
            if digits.is_empty() {
                let span = self.span_from(start);
                return self.make_error(
                    LexError::InvalidNumber {
                        detail: "hexadecimal numbers must contain at least one digit".into(),
                        span,
                    },
                    start,
                );
            }
            if !self.cursor.eat('L') {
                self.cursor.eat('l');
            }
            return self.make_token(TokenKind::IntLiteral, start);
        }

        let mut is_real = false;
        self.cursor.eat_while(|c| c.is_ascii_digit());
        if self.cursor.peek() == Some('.') && self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_digit());
            is_real = true;
        }
        if matches!(self.cursor.peek(), Some('e' | 'E')) {
            self.cursor.advance();
            if matches!(self.cursor.peek(), Some('+' | '-')) {
                self.cursor.advance();
            }
            if self.cursor.eat_while(|c| c.is_ascii_digit()).is_empty() {
                let span = self.span_from(start);
                return self.make_error(
                    LexError::InvalidNumber {
                        detail: "malformed floating-point literal".into(),
                        span,
                    },
                    start,
                );
            }
            is_real = true;
        }

        match self.cursor.peek() {
            Some('f' | 'F' | 'd' | 'D') => {
                self.cursor.advance();
                self.make_token(TokenKind::RealLiteral, start)
            }
            Some('l' | 'L') if !is_real => {
                self.cursor.advance();
                self.make_token(TokenKind::IntLiteral, start)
            }
            _ if is_real => self.make_token(TokenKind::RealLiteral, start),
            _ => self.make_token(TokenKind::IntLiteral, start),
        }
    }

    fn scan_identifier(&mut self, start: Start) -> Token<'ast> {
        let word = self.cursor.eat_while(is_ident_continue);
        let kind = lookup_keyword(word).unwrap_or(TokenKind::Identifier);
        self.make_token(kind, start)
    }

    // =========================================
    // Operators and separators
    // =========================================

    fn scan_operator(&mut self, start: Start) -> Token<'ast> {
        use TokenKind::*;

        let Some(c) = self.cursor.advance() else {
            return Token::new(Eof, "", Span::point(start.line, start.col));
        };
        let kind = match c {
            '(' => LeftParen,
            ')' => RightParen,
            '{' => LeftBrace,
            '}' => RightBrace,
            '[' => LeftBracket,
            ']' => RightBracket,
            ';' => Semicolon,
            ',' => Comma,
            '.' => Dot,
            '?' => Question,
            ':' => Colon,
            '~' => Tilde,
            '=' => self.pick('=', EqualEqual, Assign),
            '!' => self.pick('=', BangEqual, Bang),
            '*' => self.pick('=', StarEqual, Star),
            '/' => self.pick('=', SlashEqual, Slash),
            '%' => self.pick('=', PercentEqual, Percent),
            '^' => self.pick('=', CaretEqual, Caret),
            '+' => {
                if self.cursor.eat('+') {
                    PlusPlus
                } else {
                    self.pick('=', PlusEqual, Plus)
                }
            }
            '-' => {
                if self.cursor.eat('-') {
                    MinusMinus
                } else {
                    self.pick('=', MinusEqual, Minus)
                }
            }
            '&' => {
                if self.cursor.eat('&') {
                    AmpAmp
                } else {
                    self.pick('=', AmpEqual, Amp)
                }
            }
            '|' => {
                if self.cursor.eat('|') {
                    PipePipe
                } else {
                    self.pick('=', PipeEqual, Pipe)
                }
            }
            '<' => {
                if self.cursor.eat('<') {
                    self.pick('=', LessLessEqual, LessLess)
                } else {
                    self.pick('=', LessEqual, Less)
                }
            }
            '>' => {
                if self.cursor.eat('>') {
                    if self.cursor.eat('>') {
                        self.pick('=', GreaterGreaterGreaterEqual, GreaterGreaterGreater)
                    } else {
                        self.pick('=', GreaterGreaterEqual, GreaterGreater)
                    }
                } else {
                    self.pick('=', GreaterEqual, Greater)
                }
            }
            ch => {
                let span = self.span_from(start);
                return self.make_error(LexError::UnexpectedChar { ch, span }, start);
            }
        };
        self.make_token(kind, start)
    }

    /// `matched` if the next character is `next` (consuming it), else `otherwise`.
    fn pick(&mut self, next: char, matched: TokenKind, otherwise: TokenKind) -> TokenKind {
        if self.cursor.eat(next) { matched } else { otherwise }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let arena = Bump::new();
        let (tokens, errors) = Lexer::new(source, &arena).tokenize();
        assert!(errors.is_empty(), "unexpected lex errors: {errors:?}");
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn scans_a_declaration() {
        use TokenKind::*;
        assert_eq!(
            kinds("static int x = 5;"),
            vec![Static, Int, Identifier, Assign, IntLiteral, Semicolon, Eof]
        );
    }

    #[test]
    fn longest_operator_wins() {
        use TokenKind::*;
        assert_eq!(
            kinds(">>>= >>= >> >= > <<= ++ += &&"),
            vec![
                GreaterGreaterGreaterEqual,
                GreaterGreaterEqual,
                GreaterGreater,
                GreaterEqual,
                Greater,
                LessLessEqual,
                PlusPlus,
                PlusEqual,
                AmpAmp,
                Eof
            ]
        );
    }

    #[test]
    fn literals_and_comments() {
        use TokenKind::*;
        let source = "// line\n 3.14 /* block */ 2e5 10L 0x1F 'a' '\\n' \"s\\t\" true null";
        assert_eq!(
            kinds(source),
            vec![
                RealLiteral,
                RealLiteral,
                IntLiteral,
                IntLiteral,
                CharLiteral,
                CharLiteral,
                StringLiteral,
                True,
                Null,
                Eof
            ]
        );
    }

    #[test]
    fn spans_point_at_token_starts() {
        let arena = Bump::new();
        let (tokens, _) = Lexer::new("int\n  value;", &arena).tokenize();
        assert_eq!(tokens[1].lexeme, "value");
        assert_eq!(tokens[1].span, Span::new(2, 3, 5));
    }

    #[test]
    fn bad_input_becomes_unreserved() {
        let arena = Bump::new();
        let (tokens, errors) = Lexer::new("int # x", &arena).tokenize();
        assert_eq!(tokens[1].kind, TokenKind::Unreserved);
        assert!(matches!(errors[0], LexError::UnexpectedChar { ch: '#', .. }));
    }

    #[test]
    fn unterminated_string_is_reported() {
        let arena = Bump::new();
        let (tokens, errors) = Lexer::new("\"open\nint", &arena).tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Unreserved);
        assert!(matches!(errors[0], LexError::UnterminatedString { .. }));
        assert_eq!(tokens[1].kind, TokenKind::Int);
    }
}
