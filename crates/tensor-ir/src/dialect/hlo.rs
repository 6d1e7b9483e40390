//! `xla_hlo` dialect: high-level tensor operations.

use crate::context::{IrContext, OpBuilder};
use crate::location::Location;
use crate::ops::{self, ConversionError, DialectOp, binary_op};
use crate::refs::{OpRef, TypeRef, ValueRef};
use crate::types::Attribute;

crate::symbols! {
    DIALECT_NAME => "xla_hlo",
    COMPARE => "compare",
    IOTA => "iota",
    ATTR_COMPARISON_DIRECTION => "comparison_direction",
    ATTR_IOTA_DIMENSION => "iota_dimension",
    ATTR_BROADCAST_DIMENSIONS => "broadcast_dimensions",
}

/// The `broadcast_dimensions` attribute of an elementwise op, if present.
pub fn broadcast_dimensions(ctx: &IrContext, op: OpRef) -> Option<&Attribute> {
    ctx.op_attr(op, ATTR_BROADCAST_DIMENSIONS())
}

// ============================================================================
// xla_hlo.compare
// ============================================================================

/// `xla_hlo.compare %lhs, %rhs {comparison_direction = "LT"}`: elementwise
/// comparison producing an `i1` tensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Compare(OpRef);

impl DialectOp for Compare {
    const DIALECT_NAME: &'static str = "xla_hlo";
    const OP_NAME: &'static str = "compare";

    fn from_op(ctx: &IrContext, op: OpRef) -> Result<Self, ConversionError> {
        ops::expect_op::<Self>(ctx, op, "xla_hlo.compare")?;
        ops::expect_operands(ctx, op, 2)?;
        ops::expect_result(ctx, op)?;
        Ok(Self(op))
    }

    fn op_ref(&self) -> OpRef {
        self.0
    }
}

impl Compare {
    pub fn op_ref(&self) -> OpRef {
        self.0
    }

    pub fn lhs(&self, ctx: &IrContext) -> ValueRef {
        ctx.op_operands(self.0)[0]
    }

    pub fn rhs(&self, ctx: &IrContext) -> ValueRef {
        ctx.op_operands(self.0)[1]
    }

    pub fn result(&self, ctx: &IrContext) -> ValueRef {
        ctx.op_result(self.0, 0)
    }

    pub fn result_ty(&self, ctx: &IrContext) -> TypeRef {
        ctx.op_result_types(self.0)[0]
    }

    /// The comparison direction symbol (`"EQ"`, `"LT"`, ...), unvalidated.
    pub fn comparison_direction<'a>(&self, ctx: &'a IrContext) -> Result<&'a str, ConversionError> {
        ops::required_attr(ctx, self.0, "comparison_direction", Attribute::as_str)
    }
}

pub fn compare(
    ctx: &mut IrContext,
    location: Location,
    lhs: ValueRef,
    rhs: ValueRef,
    result_ty: TypeRef,
    comparison_direction: &str,
) -> Compare {
    let op = OpBuilder::new(location, DIALECT_NAME(), COMPARE())
        .operands([lhs, rhs])
        .result(result_ty)
        .attr(
            ATTR_COMPARISON_DIRECTION(),
            Attribute::String(comparison_direction.to_owned()),
        )
        .build(ctx);
    Compare(op)
}

// ============================================================================
// xla_hlo.iota
// ============================================================================

/// `xla_hlo.iota {iota_dimension = k}`: a tensor counting `0, 1, 2, ...` along
/// dimension `k` and repeated across the others.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Iota(OpRef);

impl DialectOp for Iota {
    const DIALECT_NAME: &'static str = "xla_hlo";
    const OP_NAME: &'static str = "iota";

    fn from_op(ctx: &IrContext, op: OpRef) -> Result<Self, ConversionError> {
        ops::expect_op::<Self>(ctx, op, "xla_hlo.iota")?;
        ops::expect_operands(ctx, op, 0)?;
        ops::expect_result(ctx, op)?;
        Ok(Self(op))
    }

    fn op_ref(&self) -> OpRef {
        self.0
    }
}

impl Iota {
    pub fn op_ref(&self) -> OpRef {
        self.0
    }

    pub fn result(&self, ctx: &IrContext) -> ValueRef {
        ctx.op_result(self.0, 0)
    }

    pub fn result_ty(&self, ctx: &IrContext) -> TypeRef {
        ctx.op_result_types(self.0)[0]
    }

    pub fn iota_dimension(&self, ctx: &IrContext) -> Result<u64, ConversionError> {
        ops::required_attr(ctx, self.0, "iota_dimension", Attribute::as_int_bits)
    }
}

pub fn iota(ctx: &mut IrContext, location: Location, result_ty: TypeRef, iota_dimension: u64) -> Iota {
    let op = OpBuilder::new(location, DIALECT_NAME(), IOTA())
        .result(result_ty)
        .attr(ATTR_IOTA_DIMENSION(), Attribute::IntBits(iota_dimension))
        .build(ctx);
    Iota(op)
}

// ============================================================================
// Elementwise binary operations
// ============================================================================

binary_op!("xla_hlo", "add" => Add, add);
binary_op!("xla_hlo", "sub" => Sub, sub);
binary_op!("xla_hlo", "mul" => Mul, mul);
binary_op!("xla_hlo", "div" => Div, div);
binary_op!("xla_hlo", "rem" => Rem, rem);
binary_op!(
    /// Logical and over predicate tensors.
    "xla_hlo", "and" => And, and
);
