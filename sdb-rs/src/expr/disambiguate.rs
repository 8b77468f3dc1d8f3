//! Unary/binary operator disambiguation.
//!
//! `+`, `-` and `*` are lexed as binary operators.  One left-to-right pass
//! rewrites those that have no operand before them: a token is in operand
//! position when it is the first non-whitespace token, or when the nearest
//! preceding non-whitespace token is an operator (binary, or unary already
//! rewritten by this pass) or `(`.
//!
//! Skipping whitespace when looking back makes `3- -2` and `3--2` equal.
//! Because `+`/`-` count as operators both before and after being rewritten,
//! `-*p` reads `*` as a dereference regardless of the order the rewrite and
//! the look-back happen in.

use super::token::{Token, TokenKind};

pub fn disambiguate(tokens: &mut [Token]) {
    let mut prev: Option<TokenKind> = None;
    for tok in tokens.iter_mut() {
        if tok.is_whitespace() {
            continue;
        }
        let operand_position = match prev {
            None => true,
            Some(k) => k.is_operator() || k == TokenKind::LParen,
        };
        if operand_position {
            tok.kind = match tok.kind {
                TokenKind::Plus => TokenKind::UnaryPlus,
                TokenKind::Minus => TokenKind::UnaryMinus,
                TokenKind::Star => TokenKind::Deref,
                other => other,
            };
        }
        prev = Some(tok.kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::lexer::tokenize;
    use crate::expr::test_support::TestCtx;
    use TokenKind::*;

    fn classify(src: &str) -> Vec<TokenKind> {
        let mut t = tokenize(src, &TestCtx::new(), 64).unwrap();
        disambiguate(&mut t);
        t.into_iter()
            .map(|t| t.kind)
            .filter(|&k| k != Whitespace)
            .collect()
    }

    #[test]
    fn leading_minus_is_unary() {
        assert_eq!(classify("-3+2"), vec![UnaryMinus, Integer, Plus, Integer]);
    }

    #[test]
    fn minus_after_operator() {
        assert_eq!(classify("3- -2"), vec![Integer, Minus, UnaryMinus, Integer]);
        assert_eq!(classify("3--2"), vec![Integer, Minus, UnaryMinus, Integer]);
    }

    #[test]
    fn plus_then_minus() {
        assert_eq!(classify("1 +- 2"), vec![Integer, Plus, UnaryMinus, Integer]);
    }

    #[test]
    fn after_lparen() {
        assert_eq!(
            classify("(-1)"),
            vec![LParen, UnaryMinus, Integer, RParen]
        );
    }

    #[test]
    fn after_rparen_stays_binary() {
        assert_eq!(
            classify("(1)-2"),
            vec![LParen, Integer, RParen, Minus, Integer]
        );
    }

    #[test]
    fn star_dereference() {
        assert_eq!(classify("*0x80000000"), vec![Deref, Integer]);
        assert_eq!(classify("1+*4"), vec![Integer, Plus, Deref, Integer]);
        assert_eq!(classify("-*4"), vec![UnaryMinus, Deref, Integer]);
        assert_eq!(classify("2**4"), vec![Integer, Star, Deref, Integer]);
        assert_eq!(classify("2*4"), vec![Integer, Star, Integer]);
    }

    #[test]
    fn star_after_lparen_or_comparison() {
        assert_eq!(classify("(*$sp)"), vec![LParen, Deref, Register, RParen]);
        assert_eq!(classify("1==*4"), vec![Integer, Eq, Deref, Integer]);
        assert_eq!(classify("1&&*4"), vec![Integer, And, Deref, Integer]);
        assert_eq!(classify("(1)*4"), vec![LParen, Integer, RParen, Star, Integer]);
    }

    #[test]
    fn chained_unary() {
        assert_eq!(classify("--+1"), vec![UnaryMinus, UnaryMinus, UnaryPlus, Integer]);
    }

    #[test]
    fn register_is_an_operand() {
        assert_eq!(classify("$x-1"), vec![Register, Minus, Integer]);
    }

    #[test]
    fn text_is_untouched() {
        let mut t = tokenize("-1", &TestCtx::new(), 8).unwrap();
        disambiguate(&mut t);
        assert_eq!(t[0].text, "-");
    }
}
