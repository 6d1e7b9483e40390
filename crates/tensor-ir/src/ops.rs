//! Typed operation wrappers.
//!
//! Provides the `DialectOp` trait implemented by every dialect operation
//! wrapper, the `ConversionError` returned when an operation does not have the
//! expected shape, and the `binary_op!` macro used by the tensor and standard
//! dialects for their two-operand, one-result operations.

use derive_more::{Display, Error};

use crate::context::IrContext;
use crate::refs::OpRef;
use crate::symbol::Symbol;
use crate::types::Attribute;

/// Error when converting an operation to a dialect-specific wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ConversionError {
    /// Operation name doesn't match expected dialect.operation.
    #[display("expected operation {expected}, found {actual}")]
    WrongOperation {
        expected: &'static str,
        actual: String,
    },
    /// Missing required attribute.
    #[display("missing attribute `{_0}`")]
    MissingAttribute(#[error(not(source))] &'static str),
    /// Attribute has wrong type.
    #[display("attribute `{_0}` has the wrong kind")]
    WrongAttributeType(#[error(not(source))] &'static str),
    /// Missing result type.
    #[display("operation has no result")]
    MissingResult,
    /// Missing region.
    #[display("operation has no region")]
    MissingRegion,
    /// Wrong number of operands.
    #[display("expected {expected} operand(s), found {actual}")]
    WrongOperandCount { expected: usize, actual: usize },
}

/// Trait for dialect operation wrappers.
pub trait DialectOp: Sized + Copy {
    const DIALECT_NAME: &'static str;
    const OP_NAME: &'static str;

    /// Try to wrap an operation as this dialect op type.
    fn from_op(ctx: &IrContext, op: OpRef) -> Result<Self, ConversionError>;

    /// Get the underlying operation.
    fn op_ref(&self) -> OpRef;

    fn matches(ctx: &IrContext, op: OpRef) -> bool {
        let data = ctx.op(op);
        data.dialect == Symbol::new(Self::DIALECT_NAME) && data.name == Symbol::new(Self::OP_NAME)
    }
}

// ============================================================================
// Validation helpers shared by the dialect wrappers
// ============================================================================

pub(crate) fn expect_op<T: DialectOp>(
    ctx: &IrContext,
    op: OpRef,
    expected: &'static str,
) -> Result<(), ConversionError> {
    if T::matches(ctx, op) {
        return Ok(());
    }
    let data = ctx.op(op);
    Err(ConversionError::WrongOperation {
        expected,
        actual: format!("{}.{}", data.dialect, data.name),
    })
}

pub(crate) fn expect_operands(
    ctx: &IrContext,
    op: OpRef,
    expected: usize,
) -> Result<(), ConversionError> {
    let actual = ctx.op_operands(op).len();
    if actual != expected {
        return Err(ConversionError::WrongOperandCount { expected, actual });
    }
    Ok(())
}

pub(crate) fn expect_result(ctx: &IrContext, op: OpRef) -> Result<(), ConversionError> {
    if ctx.op_result_types(op).len() != 1 {
        return Err(ConversionError::MissingResult);
    }
    Ok(())
}

pub(crate) fn expect_region(ctx: &IrContext, op: OpRef) -> Result<(), ConversionError> {
    if ctx.op(op).regions.is_empty() {
        return Err(ConversionError::MissingRegion);
    }
    Ok(())
}

/// Read a required attribute through `read`, mapping absence and kind
/// mismatches to `ConversionError`.
pub(crate) fn required_attr<'a, T>(
    ctx: &'a IrContext,
    op: OpRef,
    key: &'static str,
    read: impl FnOnce(&'a Attribute) -> Option<T>,
) -> Result<T, ConversionError> {
    let attr = ctx
        .op_attr(op, Symbol::new(key))
        .ok_or(ConversionError::MissingAttribute(key))?;
    read(attr).ok_or(ConversionError::WrongAttributeType(key))
}

/// Define a wrapper for an operation with two operands (`lhs`, `rhs`) and one
/// result, plus its constructor function.
macro_rules! binary_op {
    ($(#[$meta:meta])* $dialect:literal, $op:literal => $wrapper:ident, $ctor:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub struct $wrapper($crate::refs::OpRef);

        impl $crate::ops::DialectOp for $wrapper {
            const DIALECT_NAME: &'static str = $dialect;
            const OP_NAME: &'static str = $op;

            fn from_op(
                ctx: &$crate::context::IrContext,
                op: $crate::refs::OpRef,
            ) -> Result<Self, $crate::ops::ConversionError> {
                $crate::ops::expect_op::<Self>(ctx, op, concat!($dialect, ".", $op))?;
                $crate::ops::expect_operands(ctx, op, 2)?;
                $crate::ops::expect_result(ctx, op)?;
                Ok(Self(op))
            }

            fn op_ref(&self) -> $crate::refs::OpRef {
                self.0
            }
        }

        impl $wrapper {
            pub fn op_ref(&self) -> $crate::refs::OpRef {
                self.0
            }

            pub fn lhs(&self, ctx: &$crate::context::IrContext) -> $crate::refs::ValueRef {
                ctx.op_operands(self.0)[0]
            }

            pub fn rhs(&self, ctx: &$crate::context::IrContext) -> $crate::refs::ValueRef {
                ctx.op_operands(self.0)[1]
            }

            pub fn result(&self, ctx: &$crate::context::IrContext) -> $crate::refs::ValueRef {
                ctx.op_result(self.0, 0)
            }

            pub fn result_ty(&self, ctx: &$crate::context::IrContext) -> $crate::refs::TypeRef {
                ctx.op_result_types(self.0)[0]
            }
        }

        pub fn $ctor(
            ctx: &mut $crate::context::IrContext,
            location: $crate::location::Location,
            lhs: $crate::refs::ValueRef,
            rhs: $crate::refs::ValueRef,
            result_ty: $crate::refs::TypeRef,
        ) -> $wrapper {
            let op = $crate::context::OpBuilder::new(
                location,
                $crate::symbol::Symbol::new($dialect),
                $crate::symbol::Symbol::new($op),
            )
            .operands([lhs, rhs])
            .result(result_ty)
            .build(ctx);
            $wrapper(op)
        }
    };
}

pub(crate) use binary_op;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_error_messages() {
        let err = ConversionError::WrongOperation {
            expected: "xla_hlo.iota",
            actual: "std.constant".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "expected operation xla_hlo.iota, found std.constant"
        );
        assert_eq!(
            ConversionError::MissingAttribute("iota_dimension").to_string(),
            "missing attribute `iota_dimension`"
        );
        assert_eq!(
            ConversionError::WrongOperandCount {
                expected: 2,
                actual: 1
            }
            .to_string(),
            "expected 2 operand(s), found 1"
        );
    }
}
