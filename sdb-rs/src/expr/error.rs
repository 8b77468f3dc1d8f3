//! Error types for the expression pipeline.
//!
//! Lexing failures carry a byte offset into the input line; evaluation
//! failures carry the index of the offending token.  Both are recoverable:
//! the monitor prints them and keeps running.

use std::fmt;

use super::Word;

// ── LexError ──────────────────────────────────────────────────────────────────

/// Failure while turning the input line into tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// No rule of the pattern table matches at this byte offset.
    NoMatch { offset: usize },
    /// The expression needs more tokens than the configured capacity.
    TooManyTokens { limit: usize },
    /// An integer literal does not fit in a machine word.
    LiteralOverflow { offset: usize },
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::NoMatch { offset } => write!(f, "no match at position {offset}"),
            LexError::TooManyTokens { limit } => {
                write!(f, "too many tokens (limit {limit})")
            }
            LexError::LiteralOverflow { offset } => {
                write!(f, "integer literal at position {offset} does not fit in a word")
            }
        }
    }
}

impl std::error::Error for LexError {}

// ── EvalError ─────────────────────────────────────────────────────────────────

/// Failure while reducing a token range to a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// The line holds no tokens other than whitespace.
    Empty,
    /// A single-token range that is not a number or resolved register.
    NotAnAtom { index: usize },
    /// No operator splits the range, or the operator has a missing operand.
    Malformed { index: usize },
    DivisionByZero { index: usize },
    UnresolvedRegister { name: String },
    MemoryFault { address: Word },
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::Empty => write!(f, "empty expression"),
            EvalError::NotAnAtom { index } => write!(f, "token {index} is not a value"),
            EvalError::Malformed { index } => write!(f, "malformed expression at token {index}"),
            EvalError::DivisionByZero { index } => write!(f, "division by zero at token {index}"),
            EvalError::UnresolvedRegister { name } => write!(f, "unknown register ${name}"),
            EvalError::MemoryFault { address } => {
                write!(f, "cannot read memory at {address:#010x}")
            }
        }
    }
}

impl std::error::Error for EvalError {}

// ── ExprError ─────────────────────────────────────────────────────────────────

/// Any failure of [`evaluate`](super::evaluate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
    Lex(LexError),
    Eval(EvalError),
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprError::Lex(e) => write!(f, "{e}"),
            ExprError::Eval(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ExprError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExprError::Lex(e) => Some(e),
            ExprError::Eval(e) => Some(e),
        }
    }
}

impl From<LexError> for ExprError {
    fn from(e: LexError) -> Self {
        ExprError::Lex(e)
    }
}

impl From<EvalError> for ExprError {
    fn from(e: EvalError) -> Self {
        ExprError::Eval(e)
    }
}

// ── Capability errors ─────────────────────────────────────────────────────────

/// Returned by [`EvalContext::resolve_register`](super::EvalContext::resolve_register)
/// for a name the machine does not know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRegister(pub String);

impl fmt::Display for UnknownRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown register '{}'", self.0)
    }
}

impl std::error::Error for UnknownRegister {}

/// Returned by [`EvalContext::read_word`](super::EvalContext::read_word).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemError {
    OutOfBounds { addr: Word },
}

impl fmt::Display for MemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemError::OutOfBounds { addr } => write!(f, "address {addr:#010x} is out of bound"),
        }
    }
}

impl std::error::Error for MemError {}
