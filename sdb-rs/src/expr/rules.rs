//! The lexer's pattern table.
//!
//! Rules are tried in table order at the current offset and the first match
//! wins, so the order is significant:
//!
//! | Must precede | Because |
//! |--------------|---------|
//! | hex before decimal | `0x10` would otherwise lex as `0` then identifier `x10` |
//! | `==` `!=` `&&` before single-character operators | longest operator first |
//! | register before identifier | keeps `$` attached to the register name |
//!
//! Every pattern is anchored with `^`, so a match further along the
//! remaining input is never accepted.

use std::sync::OnceLock;

use regex::Regex;

use super::token::TokenKind;

/// What the lexer does with the text a rule matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleAction {
    /// Emit a token of this kind with the matched text.
    Emit(TokenKind),
    /// `0x…` literal: emit [`TokenKind::Integer`] with the decimal value.
    HexLiteral,
    /// `$name`: resolve through the context, emit [`TokenKind::Register`].
    Register,
}

/// Source form of the table.
const TABLE: &[(&str, RuleAction)] = &[
    (r"^[ \t]+", RuleAction::Emit(TokenKind::Whitespace)),
    (r"^0[xX][0-9a-fA-F]+", RuleAction::HexLiteral),
    (r"^[0-9]+", RuleAction::Emit(TokenKind::Integer)),
    (r"^\$[A-Za-z0-9_]+", RuleAction::Register),
    (r"^[A-Za-z_][A-Za-z0-9_]*", RuleAction::Emit(TokenKind::Ident)),
    (r"^==", RuleAction::Emit(TokenKind::Eq)),
    (r"^!=", RuleAction::Emit(TokenKind::Ne)),
    (r"^&&", RuleAction::Emit(TokenKind::And)),
    (r"^\+", RuleAction::Emit(TokenKind::Plus)),
    (r"^-", RuleAction::Emit(TokenKind::Minus)),
    (r"^\*", RuleAction::Emit(TokenKind::Star)),
    (r"^/", RuleAction::Emit(TokenKind::Slash)),
    (r"^\(", RuleAction::Emit(TokenKind::LParen)),
    (r"^\)", RuleAction::Emit(TokenKind::RParen)),
];

/// A compiled rule.
#[derive(Debug)]
pub struct Rule {
    pub regex: Regex,
    pub action: RuleAction,
}

/// The compiled table, built on first use and shared read-only afterwards.
pub fn rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| {
        TABLE
            .iter()
            .map(|&(src, action)| Rule {
                regex: Regex::new(src).expect("built-in lexer rule must compile"),
                action,
            })
            .collect()
    })
}
