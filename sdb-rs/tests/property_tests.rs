use std::collections::HashMap;

use proptest::prelude::*;
use sdb::expr::{evaluate, EvalContext, EvalError, Evaluator, ExprError, MemError, UnknownRegister, Word};

// ── Context ───────────────────────────────────────────────────────────────────

struct Regs(HashMap<&'static str, Word>);

impl Regs {
    fn new() -> Self {
        Regs(HashMap::from([("a0", 5), ("sp", 0x1000), ("pc", 0x8000_0000)]))
    }
}

impl EvalContext for Regs {
    fn resolve_register(&self, name: &str) -> Result<Word, UnknownRegister> {
        self.0
            .get(name)
            .copied()
            .ok_or_else(|| UnknownRegister(name.to_owned()))
    }

    fn read_word(&self, addr: Word) -> Result<Word, MemError> {
        if addr % 4 == 0 && addr < 0x2000 {
            Ok(addr / 4)
        } else {
            Err(MemError::OutOfBounds { addr })
        }
    }
}

// ── Reference evaluator ───────────────────────────────────────────────────────
//
// Recursive descent with C `unsigned` semantics, written independently of the
// range-splitting evaluator:
//
//   expr    := term (('+' | '-') term)*
//   term    := unary (('*' | '/') unary)*
//   unary   := ('+' | '-') unary | primary
//   primary := number | '(' expr ')'

#[derive(Debug, PartialEq)]
enum RefError {
    DivByZero,
    Syntax,
}

struct RefParser {
    chars: Vec<char>,
    pos: usize,
}

impl RefParser {
    fn eval(src: &str) -> Result<Word, RefError> {
        let mut p = RefParser {
            chars: src.chars().filter(|c| *c != ' ').collect(),
            pos: 0,
        };
        let v = p.parse_expr()?;
        if p.pos != p.chars.len() {
            return Err(RefError::Syntax);
        }
        Ok(v)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_expr(&mut self) -> Result<Word, RefError> {
        let mut lhs = self.parse_term()?;
        loop {
            if self.eat('+') {
                lhs = lhs.wrapping_add(self.parse_term()?);
            } else if self.eat('-') {
                lhs = lhs.wrapping_sub(self.parse_term()?);
            } else {
                return Ok(lhs);
            }
        }
    }

    fn parse_term(&mut self) -> Result<Word, RefError> {
        let mut lhs = self.parse_unary()?;
        loop {
            if self.eat('*') {
                lhs = lhs.wrapping_mul(self.parse_unary()?);
            } else if self.eat('/') {
                let rhs = self.parse_unary()?;
                lhs = lhs.checked_div(rhs).ok_or(RefError::DivByZero)?;
            } else {
                return Ok(lhs);
            }
        }
    }

    fn parse_unary(&mut self) -> Result<Word, RefError> {
        if self.eat('-') {
            Ok(self.parse_unary()?.wrapping_neg())
        } else if self.eat('+') {
            self.parse_unary()
        } else {
            self.parse_primary()
        }
    }

    fn parse_primary(&mut self) -> Result<Word, RefError> {
        if self.eat('(') {
            let v = self.parse_expr()?;
            return if self.eat(')') { Ok(v) } else { Err(RefError::Syntax) };
        }
        let start = self.pos;
        while matches!(self.peek(), Some('0'..='9')) {
            self.pos += 1;
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        digits.parse().map_err(|_| RefError::Syntax)
    }
}

// ── Generators ────────────────────────────────────────────────────────────────

/// Random expressions: numbers below 128 followed by 0-3 spaces,
/// parenthesised sub-expressions, and the operators `+ - * /` plus the
/// `+-` pair (binary plus followed by unary minus).
fn gen_expr() -> impl Strategy<Value = String> {
    let leaf = (0u32..128, 0usize..4).prop_map(|(n, sp)| format!("{n}{}", " ".repeat(sp)));
    leaf.prop_recursive(6, 64, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|e| format!("({e})")),
            (
                inner.clone(),
                prop::sample::select(vec!["+", "-", "*", "/", "+-"]),
                inner
            )
                .prop_map(|(l, op, r)| format!("{l}{op}{r}")),
        ]
    })
}

// ── Properties ────────────────────────────────────────────────────────────────

proptest! {
    /// Generated expressions agree with the reference evaluator, including
    /// on division by zero.
    #[test]
    fn matches_reference(src in gen_expr()) {
        let expected = RefParser::eval(&src);
        let got = Evaluator::with_max_tokens(10_000).evaluate(&src, &Regs::new());
        match expected {
            Ok(v) => prop_assert_eq!(got, Ok(v), "{}", src),
            Err(RefError::DivByZero) => prop_assert!(
                matches!(got, Err(ExprError::Eval(EvalError::DivisionByZero { .. }))),
                "{} gave {:?}", src, got
            ),
            Err(RefError::Syntax) => prop_assert!(false, "generator produced bad input {}", src),
        }
    }
}

proptest! {
    /// Arbitrary input never panics; it evaluates or reports an error.
    #[test]
    fn never_panics(s in "\\PC*") {
        let _ = evaluate(&s, &Regs::new());
    }
}

proptest! {
    /// Inputs drawn from the expression alphabet reach deeper into the
    /// evaluator than arbitrary text; they must not panic either.
    #[test]
    fn expression_alphabet_never_panics(s in "[0-9a-fx$()+*/=!& -]{0,40}") {
        let _ = Evaluator::with_max_tokens(64).evaluate(&s, &Regs::new());
    }
}

proptest! {
    /// Evaluating the same text twice gives the same answer.
    #[test]
    fn idempotent(src in gen_expr()) {
        let ev = Evaluator::with_max_tokens(10_000);
        let ctx = Regs::new();
        prop_assert_eq!(ev.evaluate(&src, &ctx), ev.evaluate(&src, &ctx));
    }
}

proptest! {
    /// Wrapping an expression in parentheses does not change its value.
    #[test]
    fn parentheses_are_transparent(src in gen_expr()) {
        let ev = Evaluator::with_max_tokens(10_000);
        let ctx = Regs::new();
        let plain = ev.evaluate(&src, &ctx).ok();
        let wrapped = ev.evaluate(&format!("({src})"), &ctx).ok();
        prop_assert_eq!(plain, wrapped);
    }
}

// ── Fixed cases ───────────────────────────────────────────────────────────────

#[test]
fn registers_and_memory() {
    let ctx = Regs::new();
    assert_eq!(evaluate("$a0*2", &ctx), Ok(10));
    assert_eq!(evaluate("*$sp", &ctx), Ok(0x400));
    assert_eq!(evaluate("*($sp + 8) + 1", &ctx), Ok(0x403));
    assert!(matches!(
        evaluate("*($sp + 1)", &ctx),
        Err(ExprError::Eval(EvalError::MemoryFault { address: 0x1001 }))
    ));
    assert!(matches!(
        evaluate("$t9 + 1", &ctx),
        Err(ExprError::Eval(EvalError::UnresolvedRegister { .. }))
    ));
}

#[test]
fn reference_agrees_on_examples() {
    for src in ["2+3*4", "(2+3)*4", "2-3-4", "-3+2", "3- -2", "100/7/2", "1 +- 2 * 3"] {
        assert_eq!(
            evaluate(src, &Regs::new()).ok(),
            RefParser::eval(src).ok(),
            "{src}"
        );
    }
}
