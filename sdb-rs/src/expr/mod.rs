//! Monitor expression evaluator.
//!
//! Expressions are C-like: decimal and `0x` literals, `$register`
//! references, parentheses, unary `+ - *` (the last one dereferences a
//! memory word) and binary `+ - * / == != &&`.  The result is one machine
//! [`Word`]; arithmetic wraps.
//!
//! The pipeline is [`lexer::tokenize`] → [`disambiguate::disambiguate`] →
//! [`eval::RangeEval`], all operating on a token vector owned by a single
//! call.
//!
//! Operator precedence (splits first → binds tightest):
//!   `&&`  →  `== !=`  →  `+ -`  →  `* /`  →  unary `+ - *`  →  atoms
//!
//! ```rust
//! use sdb::expr::{evaluate, EvalContext, MemError, UnknownRegister, Word};
//!
//! struct NoMachine;
//! impl EvalContext for NoMachine {
//!     fn resolve_register(&self, name: &str) -> Result<Word, UnknownRegister> {
//!         Err(UnknownRegister(name.to_owned()))
//!     }
//!     fn read_word(&self, addr: Word) -> Result<Word, MemError> {
//!         Err(MemError::OutOfBounds { addr })
//!     }
//! }
//!
//! assert_eq!(evaluate("(2 + 3) * 4", &NoMachine).unwrap(), 20);
//! ```

pub mod disambiguate;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod rules;
pub mod token;

use log::debug;

pub use error::{EvalError, ExprError, LexError, MemError, UnknownRegister};
pub use lexer::{parse_word, DEFAULT_MAX_TOKENS, MAX_TOKENS};
pub use token::{Token, TokenKind};

/// The emulated machine's word.
pub type Word = u32;

// ── EvalContext ───────────────────────────────────────────────────────────────

/// What the evaluator needs from the machine being debugged.
pub trait EvalContext {
    /// Value of register `name` (given without the leading `$`).
    fn resolve_register(&self, name: &str) -> Result<Word, UnknownRegister>;

    /// Read one word of memory at `addr`.
    fn read_word(&self, addr: Word) -> Result<Word, MemError>;
}

// ── Evaluator ─────────────────────────────────────────────────────────────────

/// Expression evaluator with a configurable token capacity.
///
/// Holds no per-expression state; every call allocates its own tokens, so
/// one `Evaluator` can be shared freely.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator {
    max_tokens: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capacity is clamped to `1..=MAX_TOKENS`.
    pub fn with_max_tokens(max_tokens: usize) -> Self {
        Self {
            max_tokens: max_tokens.clamp(1, MAX_TOKENS),
        }
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Tokenize and disambiguate `text` without evaluating it.
    pub fn tokens(&self, text: &str, ctx: &dyn EvalContext) -> Result<Vec<Token>, LexError> {
        let mut tokens = lexer::tokenize(text, ctx, self.max_tokens)?;
        disambiguate::disambiguate(&mut tokens);
        Ok(tokens)
    }

    /// Evaluate `text` against `ctx`.
    pub fn evaluate(&self, text: &str, ctx: &dyn EvalContext) -> Result<Word, ExprError> {
        let result = self.evaluate_inner(text, ctx);
        if let Err(e) = &result {
            debug!("evaluate {text:?}: {e}");
        }
        result
    }

    fn evaluate_inner(&self, text: &str, ctx: &dyn EvalContext) -> Result<Word, ExprError> {
        let tokens = self.tokens(text, ctx)?;
        if let Some(name) = lexer::unresolved_register(&tokens) {
            return Err(EvalError::UnresolvedRegister {
                name: name.to_owned(),
            }
            .into());
        }
        Ok(eval::RangeEval::new(&tokens, ctx).eval_all()?)
    }
}

/// Evaluate `text` with the default token capacity.
pub fn evaluate(text: &str, ctx: &dyn EvalContext) -> Result<Word, ExprError> {
    Evaluator::default().evaluate(text, ctx)
}

// ── Test support ──────────────────────────────────────────────────────────────


// ── Tests ─────────────────────────────────────────────────────────────────────
