//! Core dialect: the module container.

use crate::context::{IrContext, OpBuilder};
use crate::location::Location;
use crate::ops::{self, ConversionError, DialectOp};
use crate::refs::{BlockRef, OpRef, RegionRef};
use crate::symbol::Symbol;
use crate::types::Attribute;

crate::symbols! {
    DIALECT_NAME => "core",
    MODULE => "module",
    ATTR_SYM_NAME => "sym_name",
}

/// `core.module @name { ... }`: a named container of top-level operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Module(OpRef);

impl DialectOp for Module {
    const DIALECT_NAME: &'static str = "core";
    const OP_NAME: &'static str = "module";

    fn from_op(ctx: &IrContext, op: OpRef) -> Result<Self, ConversionError> {
        ops::expect_op::<Self>(ctx, op, "core.module")?;
        ops::expect_region(ctx, op)?;
        Ok(Self(op))
    }

    fn op_ref(&self) -> OpRef {
        self.0
    }
}

impl Module {
    pub fn op_ref(&self) -> OpRef {
        self.0
    }

    /// Module name, if one was given.
    pub fn name(&self, ctx: &IrContext) -> Option<Symbol> {
        ctx.op_attr(self.0, ATTR_SYM_NAME())?.as_symbol()
    }

    pub fn body(&self, ctx: &IrContext) -> RegionRef {
        ctx.op(self.0).regions[0]
    }

    pub fn first_block(&self, ctx: &IrContext) -> Option<BlockRef> {
        ctx.region(self.body(ctx)).blocks.first().copied()
    }

    /// Top-level operations in the module's first block.
    pub fn ops(&self, ctx: &IrContext) -> Vec<OpRef> {
        match self.first_block(ctx) {
            Some(block) => ctx.block(block).ops.to_vec(),
            None => vec![],
        }
    }
}

pub fn module(ctx: &mut IrContext, location: Location, name: Symbol, body: RegionRef) -> Module {
    let op = OpBuilder::new(location, DIALECT_NAME(), MODULE())
        .attr(ATTR_SYM_NAME(), Attribute::Symbol(name))
        .region(body)
        .build(ctx);
    Module(op)
}
