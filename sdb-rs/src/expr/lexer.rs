//! Pattern-table lexer.
//!
//! Walks the input left to right.  At each offset the rules from
//! [`rules`](super::rules::rules) are tried in order and the first one that
//! matches at exactly that offset produces the next token.  Whitespace is
//! kept in the output; later stages skip it.

use log::trace;

use super::error::LexError;
use super::rules::{rules, RuleAction};
use super::token::{Token, TokenKind};
use super::{EvalContext, Word};

/// Default token capacity of one evaluation.
pub const DEFAULT_MAX_TOKENS: usize = 32;
/// Upper bound on any configured capacity.  Evaluation recurses once per
/// binary operator, so this also bounds the evaluator's stack depth.
pub const MAX_TOKENS: usize = 4096;

/// Tokenize `text`, resolving registers through `ctx`.
///
/// A register that `ctx` does not know is still emitted, with its source
/// `$name` text, so the whole line is scanned; see [`unresolved_register`].
pub fn tokenize(
    text: &str,
    ctx: &dyn EvalContext,
    max_tokens: usize,
) -> Result<Vec<Token>, LexError> {
    let table = rules();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];
        let Some((idx, rule, len)) = table
            .iter()
            .enumerate()
            .find_map(|(i, r)| r.regex.find(rest).map(|m| (i, r, m.end())))
        else {
            return Err(LexError::NoMatch { offset: pos });
        };
        let matched = &rest[..len];
        trace!(
            "match rules[{idx}] = {:?} at position {pos} with len {len}: {matched}",
            rule.regex.as_str()
        );

        if tokens.len() == max_tokens {
            return Err(LexError::TooManyTokens { limit: max_tokens });
        }

        let token = match rule.action {
            RuleAction::Emit(TokenKind::Integer) => {
                let value: Word = matched
                    .parse()
                    .map_err(|_| LexError::LiteralOverflow { offset: pos })?;
                Token::new(TokenKind::Integer, value.to_string(), pos)
            }
            RuleAction::Emit(kind) => Token::new(kind, matched, pos),
            RuleAction::HexLiteral => {
                let value = Word::from_str_radix(&matched[2..], 16)
                    .map_err(|_| LexError::LiteralOverflow { offset: pos })?;
                Token::new(TokenKind::Integer, value.to_string(), pos)
            }
            RuleAction::Register => match ctx.resolve_register(&matched[1..]) {
                Ok(value) => Token::new(TokenKind::Register, value.to_string(), pos),
                Err(e) => {
                    trace!("{e} at position {pos}");
                    Token::new(TokenKind::Register, matched, pos)
                }
            },
        };
        tokens.push(token);
        pos += len;
    }

    Ok(tokens)
}

/// Name of the first register token that was not resolved, if any.
pub fn unresolved_register(tokens: &[Token]) -> Option<&str> {
    tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Register)
        .find_map(|t| t.text.strip_prefix('$'))
}

/// Parse a decimal or `0x`-prefixed hexadecimal word.
pub fn parse_word(s: &str) -> Option<Word> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => Word::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
