//! Token kinds and the precedence ladder.

// ── TokenKind ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Whitespace,
    /// Decimal text; hex literals are normalised by the lexer.
    Integer,
    /// `$name`; the text is the decimal register value once resolved.
    Register,
    Ident,
    LParen,
    RParen,

    // Binary operators
    Plus,
    Minus,
    Star,
    Slash,
    Eq, // ==
    Ne, // !=
    And, // &&

    // Produced only by the disambiguator
    UnaryPlus,
    UnaryMinus,
    Deref,
}

/// Binding strength of an operator; lower levels split first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    LogicalAnd,
    Equality,
    Additive,
    Multiplicative,
    Unary,
}

impl TokenKind {
    pub fn is_binary(self) -> bool {
        matches!(
            self,
            TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Star
                | TokenKind::Slash
                | TokenKind::Eq
                | TokenKind::Ne
                | TokenKind::And
        )
    }

    pub fn is_unary(self) -> bool {
        matches!(
            self,
            TokenKind::UnaryPlus | TokenKind::UnaryMinus | TokenKind::Deref
        )
    }

    pub fn is_operator(self) -> bool {
        self.is_binary() || self.is_unary()
    }

    /// Precedence level, or `None` for atoms, parentheses and whitespace.
    pub fn level(self) -> Option<Level> {
        Some(match self {
            TokenKind::And => Level::LogicalAnd,
            TokenKind::Eq | TokenKind::Ne => Level::Equality,
            TokenKind::Plus | TokenKind::Minus => Level::Additive,
            TokenKind::Star | TokenKind::Slash => Level::Multiplicative,
            TokenKind::UnaryPlus | TokenKind::UnaryMinus | TokenKind::Deref => Level::Unary,
            _ => return None,
        })
    }
}

// ── Token ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte offset of the token in the input line.
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, offset: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            offset,
        }
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind == TokenKind::Whitespace
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ladder_order() {
        assert!(Level::LogicalAnd < Level::Equality);
        assert!(Level::Equality < Level::Additive);
        assert!(Level::Additive < Level::Multiplicative);
        assert!(Level::Multiplicative < Level::Unary);
    }

    #[test]
    fn atoms_have_no_level() {
        for k in [
            TokenKind::Integer,
            TokenKind::Register,
            TokenKind::Ident,
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::Whitespace,
        ] {
            assert_eq!(k.level(), None, "{k:?}");
            assert!(!k.is_operator());
        }
    }

    #[test]
    fn unary_kinds() {
        assert!(TokenKind::Deref.is_unary());
        assert!(!TokenKind::Star.is_unary());
        assert!(TokenKind::Star.is_binary());
        assert_eq!(TokenKind::UnaryMinus.level(), Some(Level::Unary));
    }
}
