//! String literal pool.
//!
//! Literals are stored in their IR form: printable ASCII is kept as is and
//! every other byte, including the trailing NUL, is written as `\XX`.

use std::fmt;

/// Handle of an interned literal; renders as `.str.N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LiteralId(u32);

impl LiteralId {
    /// Position in the pool, the `N` of `.str.N`.
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for LiteralId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".str.{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLiteral {
    pub id: LiteralId,
    /// IR-escaped bytes including the `\00` terminator.
    pub encoded: String,
    /// Byte length including the terminator.
    pub length: u32,
}

#[derive(Debug, Clone, Default)]
pub struct LiteralPool {
    entries: Vec<StringLiteral>,
}

impl LiteralPool {
    /// An empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the body of a string literal as written in source (without the
    /// quotes, escapes still unprocessed). Equal texts get distinct entries.
    pub fn intern(&mut self, source_text: &str) -> LiteralId {
        let bytes = unescape(source_text);
        let mut encoded = String::with_capacity(bytes.len() + 3);
        for &byte in &bytes {
            push_ir_byte(&mut encoded, byte);
        }
        encoded.push_str("\\00");

        let id = LiteralId(self.entries.len() as u32);
        self.entries.push(StringLiteral {
            id,
            encoded,
            length: bytes.len() as u32 + 1,
        });
        id
    }

    /// The literal interned under `id`.
    pub fn get(&self, id: LiteralId) -> Option<&StringLiteral> {
        self.entries.get(id.0 as usize)
    }

    /// Literals in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &StringLiteral> {
        self.entries.iter()
    }

    /// Number of interned literals.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was interned.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn push_ir_byte(out: &mut String, byte: u8) {
    if (0x20..0x7f).contains(&byte) && byte != b'"' && byte != b'\\' {
        out.push(byte as char);
    } else {
        out.push_str(&format!("\\{byte:02X}"));
    }
}

/// Resolve source escape sequences into the bytes they stand for.
fn unescape(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        match chars.next() {
            Some('n') => bytes.push(b'\n'),
            Some('t') => bytes.push(b'\t'),
            Some('r') => bytes.push(b'\r'),
            Some('b') => bytes.push(0x08),
            Some('f') => bytes.push(0x0c),
            Some(first @ '0'..='7') => {
                let mut value = first.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) if value * 8 + digit <= 0xff => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        _ => break,
                    }
                }
                bytes.push(value as u8);
            }
            Some(other) => {
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
            None => bytes.push(b'\\'),
        }
    }
    bytes
}
