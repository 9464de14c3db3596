//! Symbol kind and modifier flags.

use bitflags::bitflags;

bitflags! {
    /// Kind, modifier and state bits carried by every symbol.
    ///
    /// The kind bits (`CLASS` to `PARAMETER`) say what a symbol is, the
    /// modifier bits mirror the language's declaration modifiers and
    /// `UNDEFINED` marks a variable that has not been assigned yet.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SymbolFlags: u32 {
        const CLASS        = 1 << 0;
        const VARIABLE     = 1 << 1;
        const MEMBER       = 1 << 2;
        const METHOD       = 1 << 3;
        const CONSTRUCTOR  = 1 << 4;
        const BUILTIN      = 1 << 5;
        const PARAMETER    = 1 << 6;
        const UNDEFINED    = 1 << 7;
        const PUBLIC       = 1 << 8;
        const PROTECTED    = 1 << 9;
        const PRIVATE      = 1 << 10;
        const STATIC       = 1 << 11;
        const ABSTRACT     = 1 << 12;
        const FINAL        = 1 << 13;
        const NATIVE       = 1 << 14;
        const SYNCHRONIZED = 1 << 15;
        const TRANSIENT    = 1 << 16;
        const VOLATILE     = 1 << 17;
        const STRICTFP     = 1 << 18;

        /// Every bit that can be written as a declaration modifier.
        const MODIFIERS = Self::PUBLIC.bits()
            | Self::PROTECTED.bits()
            | Self::PRIVATE.bits()
            | Self::STATIC.bits()
            | Self::ABSTRACT.bits()
            | Self::FINAL.bits()
            | Self::NATIVE.bits()
            | Self::SYNCHRONIZED.bits()
            | Self::TRANSIENT.bits()
            | Self::VOLATILE.bits()
            | Self::STRICTFP.bits();
    }
}

impl SymbolFlags {
    /// Map a modifier keyword to its flag.
    pub fn from_modifier(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "public" => Self::PUBLIC,
            "protected" => Self::PROTECTED,
            "private" => Self::PRIVATE,
            "static" => Self::STATIC,
            "abstract" => Self::ABSTRACT,
            "final" => Self::FINAL,
            "native" => Self::NATIVE,
            "synchronized" => Self::SYNCHRONIZED,
            "transient" => Self::TRANSIENT,
            "volatile" => Self::VOLATILE,
            "strictfp" => Self::STRICTFP,
            _ => return None,
        })
    }

    #[inline]
    pub fn is_static(self) -> bool {
        self.contains(Self::STATIC)
    }

    #[inline]
    pub fn is_undefined(self) -> bool {
        self.contains(Self::UNDEFINED)
    }

    /// The modifier keywords set on these flags, in declaration order.
    pub fn modifier_names(self) -> impl Iterator<Item = &'static str> {
        const NAMES: [(SymbolFlags, &str); 11] = [
            (SymbolFlags::PUBLIC, "public"),
            (SymbolFlags::PROTECTED, "protected"),
            (SymbolFlags::PRIVATE, "private"),
            (SymbolFlags::STATIC, "static"),
            (SymbolFlags::ABSTRACT, "abstract"),
            (SymbolFlags::FINAL, "final"),
            (SymbolFlags::NATIVE, "native"),
            (SymbolFlags::SYNCHRONIZED, "synchronized"),
            (SymbolFlags::TRANSIENT, "transient"),
            (SymbolFlags::VOLATILE, "volatile"),
            (SymbolFlags::STRICTFP, "strictfp"),
        ];
        NAMES
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_keywords_round_into_flags() {
        let flags = ["public", "static", "final"]
            .iter()
            .filter_map(|kw| SymbolFlags::from_modifier(kw))
            .fold(SymbolFlags::empty(), |acc, f| acc | f);
        assert!(flags.is_static());
        assert_eq!(
            flags.modifier_names().collect::<Vec<_>>(),
            vec!["public", "static", "final"]
        );
    }

    #[test]
    fn non_modifiers_are_rejected() {
        assert_eq!(SymbolFlags::from_modifier("class"), None);
        assert!(!SymbolFlags::MODIFIERS.contains(SymbolFlags::UNDEFINED));
    }
}
