//! Which ops may survive a conversion.

use std::collections::HashMap;
use std::fmt;

use crate::context::IrContext;
use crate::refs::{OpRef, RegionRef};
use crate::symbol::Symbol;
use crate::walk::Preorder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Legality {
    Legal,
    Illegal,
}

type Rule = dyn Fn(&IrContext, OpRef) -> Option<Legality>;

/// Legality rules keyed by dialect and by `dialect.op`. Ops that no rule
/// covers are legal.
#[derive(Default)]
pub struct ConversionTarget {
    dialects: HashMap<Symbol, Legality>,
    ops: HashMap<(Symbol, Symbol), Legality>,
    rules: Vec<Box<Rule>>,
}

impl ConversionTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dialect(mut self, dialect: Symbol, legality: Legality) -> Self {
        self.dialects.insert(dialect, legality);
        self
    }

    pub fn with_op(mut self, dialect: Symbol, name: Symbol, legality: Legality) -> Self {
        self.ops.insert((dialect, name), legality);
        self
    }

    /// A rule that runs before the keyed ones. `None` defers to them.
    pub fn with_rule(
        mut self,
        rule: impl Fn(&IrContext, OpRef) -> Option<Legality> + 'static,
    ) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// First answering rule, else the op entry, else the dialect entry.
    pub fn legality(&self, ctx: &IrContext, op: OpRef) -> Legality {
        if let Some(decided) = self.rules.iter().find_map(|rule| rule(ctx, op)) {
            return decided;
        }
        let data = ctx.op(op);
        self.ops
            .get(&(data.dialect, data.name))
            .or_else(|| self.dialects.get(&data.dialect))
            .copied()
            .unwrap_or(Legality::Legal)
    }

    /// Illegal ops nested in `region`, outermost first.
    pub fn verify(&self, ctx: &IrContext, region: RegionRef) -> Vec<IllegalOp> {
        Preorder::new(ctx, region)
            .filter(|&op| self.legality(ctx, op) == Legality::Illegal)
            .map(|op| IllegalOp {
                op,
                dialect: ctx.op(op).dialect,
                name: ctx.op(op).name,
            })
            .collect()
    }
}

/// An op that a [`ConversionTarget`] rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IllegalOp {
    pub op: OpRef,
    pub dialect: Symbol,
    pub name: Symbol,
}

impl fmt::Display for IllegalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} ({})", self.dialect, self.name, self.op)
    }
}
