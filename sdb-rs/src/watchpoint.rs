//! Watchpoints: expressions re-evaluated after every executed instruction.
//!
//! The pool holds at most [`NR_WP`] entries.  Numbers are handed out in
//! increasing order and never reused within a session.

use std::fmt;

use log::warn;

use crate::expr::{EvalContext, Evaluator, ExprError, Word};

pub const NR_WP: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watchpoint {
    pub no: u32,
    pub expr: String,
    /// Value at the last check.
    pub last: Word,
}

/// A watchpoint whose value changed during [`WatchpointPool::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub no: u32,
    pub expr: String,
    pub old: Word,
    pub new: Word,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchError {
    PoolFull,
    NoSuchWatchpoint(u32),
    Expr(ExprError),
}

impl fmt::Display for WatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchError::PoolFull => write!(f, "no free watchpoint (limit {NR_WP})"),
            WatchError::NoSuchWatchpoint(no) => write!(f, "no watchpoint number {no}"),
            WatchError::Expr(e) => write!(f, "invalid expression: {e}"),
        }
    }
}

impl std::error::Error for WatchError {}

#[derive(Debug, Default)]
pub struct WatchpointPool {
    active: Vec<Watchpoint>,
    next_no: u32,
}

impl WatchpointPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a watchpoint on `expr`, recording its current value.
    pub fn add(
        &mut self,
        expr: &str,
        evaluator: &Evaluator,
        ctx: &dyn EvalContext,
    ) -> Result<&Watchpoint, WatchError> {
        if self.active.len() >= NR_WP {
            return Err(WatchError::PoolFull);
        }
        let expr = expr.trim();
        let last = evaluator.evaluate(expr, ctx).map_err(WatchError::Expr)?;
        let no = self.next_no;
        self.next_no += 1;
        self.active.push(Watchpoint {
            no,
            expr: expr.to_owned(),
            last,
        });
        Ok(&self.active[self.active.len() - 1])
    }

    pub fn delete(&mut self, no: u32) -> Result<Watchpoint, WatchError> {
        let idx = self
            .active
            .iter()
            .position(|w| w.no == no)
            .ok_or(WatchError::NoSuchWatchpoint(no))?;
        Ok(self.active.remove(idx))
    }

    /// Re-evaluate every watchpoint and return those whose value changed.
    ///
    /// An expression that no longer evaluates (for instance a dereference
    /// that now faults) is skipped and keeps its previous value.
    pub fn check(&mut self, evaluator: &Evaluator, ctx: &dyn EvalContext) -> Vec<Hit> {
        let mut hits = Vec::new();
        for wp in &mut self.active {
            match evaluator.evaluate(&wp.expr, ctx) {
                Ok(new) if new != wp.last => {
                    hits.push(Hit {
                        no: wp.no,
                        expr: wp.expr.clone(),
                        old: wp.last,
                        new,
                    });
                    wp.last = new;
                }
                Ok(_) => {}
                Err(e) => warn!("watchpoint {} ({}): {e}", wp.no, wp.expr),
            }
        }
        hits
    }

    pub fn iter(&self) -> impl Iterator<Item = &Watchpoint> {
        self.active.iter()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
