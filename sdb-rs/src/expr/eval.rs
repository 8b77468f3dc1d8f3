//! Divide-and-conquer evaluation over token ranges.
//!
//! A range `(p, q)` is inclusive.  Each step trims whitespace from both
//! ends, then either reads an atom, strips one enclosing pair of
//! parentheses, or splits at the dominant operator and recurses on the
//! operands.

use log::debug;

use super::error::EvalError;
use super::token::{Level, Token, TokenKind};
use super::{EvalContext, Word};

// ── Bracket checker ───────────────────────────────────────────────────────────

/// True if `(p, q)` is wrapped in one outermost matching pair of
/// parentheses, i.e. the `(` at `p` closes exactly at `q`.
pub fn encloses(tokens: &[Token], p: usize, q: usize) -> bool {
    if p >= q || tokens[p].kind != TokenKind::LParen || tokens[q].kind != TokenKind::RParen {
        return false;
    }
    let mut depth = 0usize;
    for (i, tok) in tokens.iter().enumerate().take(q + 1).skip(p) {
        match tok.kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => {
                depth -= 1;
                if depth == 0 {
                    return i == q;
                }
            }
            _ => {}
        }
    }
    false
}

// ── Operator locator ──────────────────────────────────────────────────────────

/// Index of the operator that splits `(p, q)` first, if any.
///
/// Only operators outside parentheses are candidates.  Among binary
/// operators of the loosest level the last one wins, which makes them
/// left-associative; among unary operators the first one wins, so a prefix
/// chain splits at its leftmost member.
pub fn find_split(tokens: &[Token], p: usize, q: usize) -> Option<usize> {
    let mut depth: isize = 0;
    let mut best: Option<(usize, Level)> = None;

    for (i, tok) in tokens.iter().enumerate().take(q + 1).skip(p) {
        match tok.kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => depth -= 1,
            kind if depth == 0 => {
                let Some(level) = kind.level() else { continue };
                let replace = match best {
                    None => true,
                    Some((_, cur)) if kind.is_unary() => level < cur,
                    Some((_, cur)) => level <= cur,
                };
                if replace {
                    best = Some((i, level));
                }
            }
            _ => {}
        }
    }

    best.map(|(i, _)| i)
}

// ── Evaluator ─────────────────────────────────────────────────────────────────

/// Evaluates ranges of one disambiguated token sequence.
pub struct RangeEval<'a> {
    tokens: &'a [Token],
    ctx: &'a dyn EvalContext,
}

impl<'a> RangeEval<'a> {
    pub fn new(tokens: &'a [Token], ctx: &'a dyn EvalContext) -> Self {
        Self { tokens, ctx }
    }

    /// Evaluate the whole sequence.
    pub fn eval_all(&self) -> Result<Word, EvalError> {
        if self.tokens.iter().all(Token::is_whitespace) {
            return Err(EvalError::Empty);
        }
        self.eval(0, self.tokens.len() - 1)
    }

    pub fn eval(&self, p: usize, q: usize) -> Result<Word, EvalError> {
        debug_assert!(p <= q, "empty range {p}..{q}");
        if p > q {
            return Err(EvalError::Malformed { index: p });
        }

        let (mut p, mut q) = self.trim(p, q)?;

        // Enclosing parentheses and unary prefixes are peeled off in place;
        // only binary splits recurse.  Prefixes are applied innermost first.
        let mut prefixes: Vec<TokenKind> = Vec::new();
        let value = loop {
            if p == q {
                break self.atom(p)?;
            }

            if encloses(self.tokens, p, q) {
                if q - p < 2 {
                    debug!("empty parentheses at tokens {p}..{q}");
                    return Err(EvalError::Malformed { index: p });
                }
                (p, q) = self.trim(p + 1, q - 1)?;
                continue;
            }

            let Some(op) = find_split(self.tokens, p, q) else {
                debug!("no operator splits tokens {p}..{q}");
                return Err(EvalError::Malformed { index: p });
            };
            let kind = self.tokens[op].kind;

            if kind.is_unary() {
                if op != p {
                    debug!("unary operator at {op} is not at the start of {p}..{q}");
                    return Err(EvalError::Malformed { index: op });
                }
                prefixes.push(kind);
                (p, q) = self.trim(p + 1, q)?;
                continue;
            }

            if op == p || op == q {
                debug!("binary operator at {op} is missing an operand");
                return Err(EvalError::Malformed { index: op });
            }
            let lhs = self.eval(p, op - 1)?;
            let rhs = self.eval(op + 1, q)?;
            break apply_binary(kind, lhs, rhs, op)?;
        };

        prefixes
            .into_iter()
            .rev()
            .try_fold(value, |v, kind| self.apply_unary(kind, v))
    }

    /// Drop whitespace tokens at both ends of `(p, q)`.
    fn trim(&self, mut p: usize, mut q: usize) -> Result<(usize, usize), EvalError> {
        while self.tokens[p].is_whitespace() {
            if p == q {
                return Err(EvalError::Malformed { index: p });
            }
            p += 1;
        }
        while self.tokens[q].is_whitespace() {
            q -= 1;
        }
        Ok((p, q))
    }

    fn atom(&self, i: usize) -> Result<Word, EvalError> {
        let tok = &self.tokens[i];
        match tok.kind {
            TokenKind::Integer | TokenKind::Register => {
                tok.text.parse().map_err(|_| match tok.text.strip_prefix('$') {
                    Some(name) => EvalError::UnresolvedRegister { name: name.to_owned() },
                    None => EvalError::NotAnAtom { index: i },
                })
            }
            _ => {
                debug!("token {i} ({:?} {:?}) is not a value", tok.kind, tok.text);
                Err(EvalError::NotAnAtom { index: i })
            }
        }
    }

    fn apply_unary(&self, kind: TokenKind, val: Word) -> Result<Word, EvalError> {
        match kind {
            TokenKind::UnaryPlus => Ok(val),
            TokenKind::UnaryMinus => Ok(val.wrapping_neg()),
            TokenKind::Deref => self.ctx.read_word(val).map_err(|e| {
                debug!("dereference failed: {e}");
                EvalError::MemoryFault { address: val }
            }),
            other => unreachable!("{other:?} is not a unary operator"),
        }
    }
}

fn apply_binary(kind: TokenKind, l: Word, r: Word, index: usize) -> Result<Word, EvalError> {
    Ok(match kind {
        TokenKind::Plus => l.wrapping_add(r),
        TokenKind::Minus => l.wrapping_sub(r),
        TokenKind::Star => l.wrapping_mul(r),
        TokenKind::Slash => l
            .checked_div(r)
            .ok_or(EvalError::DivisionByZero { index })?,
        TokenKind::Eq => Word::from(l == r),
        TokenKind::Ne => Word::from(l != r),
        TokenKind::And => Word::from(l != 0 && r != 0),
        other => unreachable!("{other:?} is not a binary operator"),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
