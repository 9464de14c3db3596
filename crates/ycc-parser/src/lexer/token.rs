//! Token kinds of the language.

use std::fmt;

use ycc_core::Span;

/// A token. The lexeme is copied into the AST arena so the source text can
/// be dropped once scanning is done.
#[derive(Clone, Copy, PartialEq)]
pub struct Token<'ast> {
    pub kind: TokenKind,
    pub lexeme: &'ast str,
    pub span: Span,
}

impl<'ast> Token<'ast> {
    #[inline]
    pub fn new(kind: TokenKind, lexeme: &'ast str, span: Span) -> Self {
        Self { kind, lexeme, span }
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?} @ {:?})", self.kind, self.lexeme, self.span)
    }
}

/// Every token the scanner can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // =========================================
    // Literals
    // =========================================
    IntLiteral,
    RealLiteral,
    CharLiteral,
    StringLiteral,
    Identifier,

    // =========================================
    // Keywords
    // =========================================
    Abstract,
    Boolean,
    Break,
    Byte,
    Case,
    Catch,
    Char,
    Class,
    Const,
    Continue,
    Default,
    Do,
    Double,
    Else,
    Extends,
    False,
    Final,
    Finally,
    Float,
    For,
    Goto,
    If,
    Implements,
    Import,
    Instanceof,
    Int,
    Interface,
    Long,
    Native,
    New,
    Null,
    Package,
    Private,
    Protected,
    Public,
    Return,
    Short,
    Static,
    Strictfp,
    Super,
    Switch,
    Synchronized,
    This,
    Throw,
    Throws,
    Transient,
    True,
    Try,
    Void,
    Volatile,
    While,

    // =========================================
    // Operators
    // =========================================
    Assign,
    Greater,
    Less,
    Bang,
    Tilde,
    Question,
    Colon,
    EqualEqual,
    LessEqual,
    GreaterEqual,
    BangEqual,
    AmpAmp,
    PipePipe,
    PlusPlus,
    MinusMinus,
    Plus,
    Minus,
    Star,
    Slash,
    Amp,
    Pipe,
    Caret,
    Percent,
    LessLess,
    GreaterGreater,
    GreaterGreaterGreater,
    PlusEqual,
    MinusEqual,
    StarEqual,
    SlashEqual,
    AmpEqual,
    PipeEqual,
    CaretEqual,
    PercentEqual,
    LessLessEqual,
    GreaterGreaterEqual,
    GreaterGreaterGreaterEqual,

    // =========================================
    // Separators
    // =========================================
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Semicolon,
    Comma,
    Dot,

    // =========================================
    // Special
    // =========================================
    /// Input the scanner could not classify.
    Unreserved,
    Eof,
}

impl TokenKind {
    /// Whether this kind is a reserved word.
    pub fn is_keyword(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Abstract
                | Boolean
                | Break
                | Byte
                | Case
                | Catch
                | Char
                | Class
                | Const
                | Continue
                | Default
                | Do
                | Double
                | Else
                | Extends
                | False
                | Final
                | Finally
                | Float
                | For
                | Goto
                | If
                | Implements
                | Import
                | Instanceof
                | Int
                | Interface
                | Long
                | Native
                | New
                | Null
                | Package
                | Private
                | Protected
                | Public
                | Return
                | Short
                | Static
                | Strictfp
                | Super
                | Switch
                | Synchronized
                | This
                | Throw
                | Throws
                | Transient
                | True
                | Try
                | Void
                | Volatile
                | While
        )
    }

    /// Keywords that name a built-in type.
    pub fn is_primitive_type(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Void | Boolean | Byte | Char | Short | Int | Long | Float | Double
        )
    }

    /// Keywords that can appear as declaration modifiers.
    pub fn is_modifier(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Public
                | Protected
                | Private
                | Static
                | Abstract
                | Final
                | Native
                | Synchronized
                | Transient
                | Volatile
                | Strictfp
        )
    }

    pub fn description(self) -> &'static str {
        use TokenKind::*;
        match self {
            IntLiteral => "integer literal",
            RealLiteral => "floating-point literal",
            CharLiteral => "character literal",
            StringLiteral => "string literal",
            Identifier => "identifier",
            Abstract => "'abstract'",
            Boolean => "'boolean'",
            Break => "'break'",
            Byte => "'byte'",
            Case => "'case'",
            Catch => "'catch'",
            Char => "'char'",
            Class => "'class'",
            Const => "'const'",
            Continue => "'continue'",
            Default => "'default'",
            Do => "'do'",
            Double => "'double'",
            Else => "'else'",
            Extends => "'extends'",
            False => "'false'",
            Final => "'final'",
            Finally => "'finally'",
            Float => "'float'",
            For => "'for'",
            Goto => "'goto'",
            If => "'if'",
            Implements => "'implements'",
            Import => "'import'",
            Instanceof => "'instanceof'",
            Int => "'int'",
            Interface => "'interface'",
            Long => "'long'",
            Native => "'native'",
            New => "'new'",
            Null => "'null'",
            Package => "'package'",
            Private => "'private'",
            Protected => "'protected'",
            Public => "'public'",
            Return => "'return'",
            Short => "'short'",
            Static => "'static'",
            Strictfp => "'strictfp'",
            Super => "'super'",
            Switch => "'switch'",
            Synchronized => "'synchronized'",
            This => "'this'",
            Throw => "'throw'",
            Throws => "'throws'",
            Transient => "'transient'",
            True => "'true'",
            Try => "'try'",
            Void => "'void'",
            Volatile => "'volatile'",
            While => "'while'",
            Assign => "'='",
            Greater => "'>'",
            Less => "'<'",
            Bang => "'!'",
            Tilde => "'~'",
            Question => "'?'",
            Colon => "':'",
            EqualEqual => "'=='",
            LessEqual => "'<='",
            GreaterEqual => "'>='",
            BangEqual => "'!='",
            AmpAmp => "'&&'",
            PipePipe => "'||'",
            PlusPlus => "'++'",
            MinusMinus => "'--'",
            Plus => "'+'",
            Minus => "'-'",
            Star => "'*'",
            Slash => "'/'",
            Amp => "'&'",
            Pipe => "'|'",
            Caret => "'^'",
            Percent => "'%'",
            LessLess => "'<<'",
            GreaterGreater => "'>>'",
            GreaterGreaterGreater => "'>>>'",
            PlusEqual => "'+='",
            MinusEqual => "'-='",
            StarEqual => "'*='",
            SlashEqual => "'/='",
            AmpEqual => "'&='",
            PipeEqual => "'|='",
            CaretEqual => "'^='",
            PercentEqual => "'%='",
            LessLessEqual => "'<<='",
            GreaterGreaterEqual => "'>>='",
            GreaterGreaterGreaterEqual => "'>>>='",
            LeftParen => "'('",
            RightParen => "')'",
            LeftBrace => "'{'",
            RightBrace => "'}'",
            LeftBracket => "'['",
            RightBracket => "']'",
            Semicolon => "';'",
            Comma => "','",
            Dot => "'.'",
            Unreserved => "unrecognized input",
            Eof => "end of file",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Map a word to its keyword kind, or `None` for ordinary identifiers.
pub fn lookup_keyword(word: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match word {
        "abstract" => Abstract,
        "boolean" => Boolean,
        "break" => Break,
        "byte" => Byte,
        "case" => Case,
        "catch" => Catch,
        "char" => Char,
        "class" => Class,
        "const" => Const,
        "continue" => Continue,
        "default" => Default,
        "do" => Do,
        "double" => Double,
        "else" => Else,
        "extends" => Extends,
        "false" => False,
        "final" => Final,
        "finally" => Finally,
        "float" => Float,
        "for" => For,
        "goto" => Goto,
        "if" => If,
        "implements" => Implements,
        "import" => Import,
        "instanceof" => Instanceof,
        "int" => Int,
        "interface" => Interface,
        "long" => Long,
        "native" => Native,
        "new" => New,
        "null" => Null,
        "package" => Package,
        "private" => Private,
        "protected" => Protected,
        "public" => Public,
        "return" => Return,
        "short" => Short,
        "static" => Static,
        "strictfp" => Strictfp,
        "super" => Super,
        "switch" => Switch,
        "synchronized" => Synchronized,
        "this" => This,
        "throw" => Throw,
        "throws" => Throws,
        "transient" => Transient,
        "true" => True,
        "try" => Try,
        "void" => Void,
        "volatile" => Volatile,
        "while" => While,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_recognized() {
        assert_eq!(lookup_keyword("class"), Some(TokenKind::Class));
        assert_eq!(lookup_keyword("strictfp"), Some(TokenKind::Strictfp));
        assert_eq!(lookup_keyword("String"), None);
        assert!(TokenKind::While.is_keyword());
        assert!(!TokenKind::Identifier.is_keyword());
    }

    #[test]
    fn primitive_and_modifier_groups() {
        assert!(TokenKind::Double.is_primitive_type());
        assert!(!TokenKind::Static.is_primitive_type());
        assert!(TokenKind::Static.is_modifier());
        assert!(!TokenKind::Class.is_modifier());
    }
}
