//! Func dialect: functions and returns.
//!
//! A function's signature is stored as a `core.func(<result>, <params>...)`
//! type in its `type` attribute. Functions without a result use `core.nil`
//! in the result slot.

use crate::context::{IrContext, OpBuilder};
use crate::location::Location;
use crate::ops::{self, ConversionError, DialectOp};
use crate::refs::{BlockRef, OpRef, RegionRef, TypeRef, ValueRef};
use crate::symbol::Symbol;
use crate::types::{Attribute, TypeData};

crate::symbols! {
    DIALECT_NAME => "func",
    FUNC => "func",
    RETURN => "return",
    ATTR_SYM_NAME => "sym_name",
    ATTR_TYPE => "type",
}

fn core_sym() -> Symbol {
    Symbol::new("core")
}

fn nil_sym() -> Symbol {
    Symbol::new("nil")
}

/// Intern the signature type `core.func(<result or core.nil>, <params>...)`.
pub fn function_type(ctx: &mut IrContext, params: &[TypeRef], result: Option<TypeRef>) -> TypeRef {
    let result =
        result.unwrap_or_else(|| ctx.types.intern(TypeData::new(core_sym(), nil_sym())));
    let signature = params
        .iter()
        .fold(TypeData::new(core_sym(), FUNC()).with_param(result), |data, &p| {
            data.with_param(p)
        });
    ctx.types.intern(signature)
}

/// Result type of a `core.func` signature, `None` when it is `core.nil`.
pub fn signature_result(ctx: &IrContext, signature: TypeRef) -> Option<TypeRef> {
    let result = *ctx.types.get(signature).params.first()?;
    (!ctx.types.get(result).is(core_sym(), nil_sym())).then_some(result)
}

// ============================================================================
// func.func
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Func(OpRef);

impl DialectOp for Func {
    const DIALECT_NAME: &'static str = "func";
    const OP_NAME: &'static str = "func";

    fn from_op(ctx: &IrContext, op: OpRef) -> Result<Self, ConversionError> {
        ops::expect_op::<Self>(ctx, op, "func.func")?;
        ops::expect_region(ctx, op)?;
        ops::required_attr(ctx, op, "sym_name", Attribute::as_symbol)?;
        Ok(Self(op))
    }

    fn op_ref(&self) -> OpRef {
        self.0
    }
}

impl Func {
    pub fn op_ref(&self) -> OpRef {
        self.0
    }

    pub fn sym_name(&self, ctx: &IrContext) -> Symbol {
        match ctx.op_attr(self.0, ATTR_SYM_NAME()).and_then(Attribute::as_symbol) {
            Some(name) => name,
            None => unreachable!("checked by Func::from_op"),
        }
    }

    /// Signature type, if the function carries one.
    pub fn signature(&self, ctx: &IrContext) -> Option<TypeRef> {
        ctx.op_attr(self.0, ATTR_TYPE())?.as_type()
    }

    pub fn body(&self, ctx: &IrContext) -> RegionRef {
        ctx.op(self.0).regions[0]
    }

    pub fn entry_block(&self, ctx: &IrContext) -> Option<BlockRef> {
        ctx.region(self.body(ctx)).blocks.first().copied()
    }
}

pub fn func(
    ctx: &mut IrContext,
    location: Location,
    sym_name: Symbol,
    signature: TypeRef,
    body: RegionRef,
) -> Func {
    let op = OpBuilder::new(location, DIALECT_NAME(), FUNC())
        .attr(ATTR_SYM_NAME(), Attribute::Symbol(sym_name))
        .attr(ATTR_TYPE(), Attribute::Type(signature))
        .region(body)
        .build(ctx);
    Func(op)
}

// ============================================================================
// func.return
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Return(OpRef);

impl DialectOp for Return {
    const DIALECT_NAME: &'static str = "func";
    const OP_NAME: &'static str = "return";

    fn from_op(ctx: &IrContext, op: OpRef) -> Result<Self, ConversionError> {
        ops::expect_op::<Self>(ctx, op, "func.return")?;
        Ok(Self(op))
    }

    fn op_ref(&self) -> OpRef {
        self.0
    }
}

impl Return {
    pub fn op_ref(&self) -> OpRef {
        self.0
    }

    pub fn values<'a>(&self, ctx: &'a IrContext) -> &'a [ValueRef] {
        ctx.op_operands(self.0)
    }
}

pub fn r#return(
    ctx: &mut IrContext,
    location: Location,
    values: impl IntoIterator<Item = ValueRef>,
) -> Return {
    Return(
        OpBuilder::new(location, DIALECT_NAME(), RETURN())
            .operands(values)
            .build(ctx),
    )
}
