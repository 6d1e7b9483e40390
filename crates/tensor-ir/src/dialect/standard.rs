//! `std` dialect: standard scalar/elementwise arithmetic.

use std::fmt;

use crate::context::{IrContext, OpBuilder};
use crate::location::Location;
use crate::ops::{self, ConversionError, DialectOp, binary_op};
use crate::refs::{OpRef, TypeRef, ValueRef};
use crate::shaped::{self, DenseIntElements};
use crate::symbol::Symbol;
use crate::types::Attribute;

crate::symbols! {
    DIALECT_NAME => "std",
    CONSTANT => "constant",
    CMPI => "cmpi",
    CMPF => "cmpf",
    ATTR_VALUE => "value",
    ATTR_PREDICATE => "predicate",
}

// ============================================================================
// Predicates
// ============================================================================

/// Integer comparison predicates of `std.cmpi`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CmpIPredicate {
    Eq,
    Ne,
    Slt,
    Sle,
    Sgt,
    Sge,
    Ult,
    Ule,
    Ugt,
    Uge,
}

impl CmpIPredicate {
    pub fn as_str(self) -> &'static str {
        match self {
            CmpIPredicate::Eq => "eq",
            CmpIPredicate::Ne => "ne",
            CmpIPredicate::Slt => "slt",
            CmpIPredicate::Sle => "sle",
            CmpIPredicate::Sgt => "sgt",
            CmpIPredicate::Sge => "sge",
            CmpIPredicate::Ult => "ult",
            CmpIPredicate::Ule => "ule",
            CmpIPredicate::Ugt => "ugt",
            CmpIPredicate::Uge => "uge",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "eq" => CmpIPredicate::Eq,
            "ne" => CmpIPredicate::Ne,
            "slt" => CmpIPredicate::Slt,
            "sle" => CmpIPredicate::Sle,
            "sgt" => CmpIPredicate::Sgt,
            "sge" => CmpIPredicate::Sge,
            "ult" => CmpIPredicate::Ult,
            "ule" => CmpIPredicate::Ule,
            "ugt" => CmpIPredicate::Ugt,
            "uge" => CmpIPredicate::Uge,
            _ => return None,
        })
    }
}

impl fmt::Display for CmpIPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Floating-point comparison predicates of `std.cmpf`.
///
/// Ordered (`o*`) predicates are false when either operand is NaN; unordered
/// (`u*`) predicates are true in that case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CmpFPredicate {
    AlwaysFalse,
    Oeq,
    Ogt,
    Oge,
    Olt,
    Ole,
    One,
    Ord,
    Ueq,
    Ugt,
    Uge,
    Ult,
    Ule,
    Une,
    Uno,
    AlwaysTrue,
}

impl CmpFPredicate {
    pub fn as_str(self) -> &'static str {
        match self {
            CmpFPredicate::AlwaysFalse => "false",
            CmpFPredicate::Oeq => "oeq",
            CmpFPredicate::Ogt => "ogt",
            CmpFPredicate::Oge => "oge",
            CmpFPredicate::Olt => "olt",
            CmpFPredicate::Ole => "ole",
            CmpFPredicate::One => "one",
            CmpFPredicate::Ord => "ord",
            CmpFPredicate::Ueq => "ueq",
            CmpFPredicate::Ugt => "ugt",
            CmpFPredicate::Uge => "uge",
            CmpFPredicate::Ult => "ult",
            CmpFPredicate::Ule => "ule",
            CmpFPredicate::Une => "une",
            CmpFPredicate::Uno => "uno",
            CmpFPredicate::AlwaysTrue => "true",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "false" => CmpFPredicate::AlwaysFalse,
            "oeq" => CmpFPredicate::Oeq,
            "ogt" => CmpFPredicate::Ogt,
            "oge" => CmpFPredicate::Oge,
            "olt" => CmpFPredicate::Olt,
            "ole" => CmpFPredicate::Ole,
            "one" => CmpFPredicate::One,
            "ord" => CmpFPredicate::Ord,
            "ueq" => CmpFPredicate::Ueq,
            "ugt" => CmpFPredicate::Ugt,
            "uge" => CmpFPredicate::Uge,
            "ult" => CmpFPredicate::Ult,
            "ule" => CmpFPredicate::Ule,
            "une" => CmpFPredicate::Une,
            "uno" => CmpFPredicate::Uno,
            "true" => CmpFPredicate::AlwaysTrue,
            _ => return None,
        })
    }

    /// Whether the predicate is false when either operand is NaN.
    pub fn is_ordered(self) -> bool {
        matches!(
            self,
            CmpFPredicate::AlwaysFalse
                | CmpFPredicate::Oeq
                | CmpFPredicate::Ogt
                | CmpFPredicate::Oge
                | CmpFPredicate::Olt
                | CmpFPredicate::Ole
                | CmpFPredicate::One
                | CmpFPredicate::Ord
        )
    }
}

impl fmt::Display for CmpFPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn read_predicate<T>(
    ctx: &IrContext,
    op: OpRef,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<T, ConversionError> {
    let sym = ops::required_attr(ctx, op, "predicate", Attribute::as_symbol)?;
    sym.with_str(parse)
        .ok_or(ConversionError::WrongAttributeType("predicate"))
}

// ============================================================================
// std.cmpi / std.cmpf
// ============================================================================

macro_rules! compare_op {
    ($wrapper:ident, $ctor:ident, $name:literal, $pred:ident, $name_sym:ident) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub struct $wrapper(OpRef);

        impl DialectOp for $wrapper {
            const DIALECT_NAME: &'static str = "std";
            const OP_NAME: &'static str = $name;

            fn from_op(ctx: &IrContext, op: OpRef) -> Result<Self, ConversionError> {
                ops::expect_op::<Self>(ctx, op, concat!("std.", $name))?;
                ops::expect_operands(ctx, op, 2)?;
                ops::expect_result(ctx, op)?;
                Ok(Self(op))
            }

            fn op_ref(&self) -> OpRef {
                self.0
            }
        }

        impl $wrapper {
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

            pub fn predicate(&self, ctx: &IrContext) -> Result<$pred, ConversionError> {
                read_predicate(ctx, self.0, $pred::parse)
            }
        }

        pub fn $ctor(
            ctx: &mut IrContext,
            location: Location,
            predicate: $pred,
            lhs: ValueRef,
            rhs: ValueRef,
            result_ty: TypeRef,
        ) -> $wrapper {
            let op = OpBuilder::new(location, DIALECT_NAME(), $name_sym())
                .operands([lhs, rhs])
                .result(result_ty)
                .attr(
                    ATTR_PREDICATE(),
                    Attribute::Symbol(Symbol::new(predicate.as_str())),
                )
                .build(ctx);
            $wrapper(op)
        }
    };
}

compare_op!(Cmpi, cmpi, "cmpi", CmpIPredicate, CMPI);
compare_op!(Cmpf, cmpf, "cmpf", CmpFPredicate, CMPF);

// ============================================================================
// std.constant
// ============================================================================

/// `std.constant {value = ...}`. For tensor results the value is a list with
/// one integer per element in row-major order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Constant(OpRef);

impl DialectOp for Constant {
    const DIALECT_NAME: &'static str = "std";
    const OP_NAME: &'static str = "constant";

    fn from_op(ctx: &IrContext, op: OpRef) -> Result<Self, ConversionError> {
        ops::expect_op::<Self>(ctx, op, "std.constant")?;
        ops::expect_operands(ctx, op, 0)?;
        ops::expect_result(ctx, op)?;
        ops::required_attr(ctx, op, "value", Some)?;
        Ok(Self(op))
    }

    fn op_ref(&self) -> OpRef {
        self.0
    }
}

impl Constant {
    pub fn op_ref(&self) -> OpRef {
        self.0
    }

    pub fn result(&self, ctx: &IrContext) -> ValueRef {
        ctx.op_result(self.0, 0)
    }

    pub fn result_ty(&self, ctx: &IrContext) -> TypeRef {
        ctx.op_result_types(self.0)[0]
    }

    pub fn value<'a>(&self, ctx: &'a IrContext) -> &'a Attribute {
        match ctx.op_attr(self.0, ATTR_VALUE()) {
            Some(attr) => attr,
            None => unreachable!("checked by Constant::from_op"),
        }
    }

    /// The value as dense integer elements, when the result has an integer
    /// element type and the value is a list.
    pub fn dense_int_elements(&self, ctx: &IrContext) -> Option<DenseIntElements> {
        let width = shaped::integer_width(ctx, self.result_ty(ctx))?;
        DenseIntElements::from_attribute(self.value(ctx), width)
    }
}

pub fn constant(ctx: &mut IrContext, location: Location, ty: TypeRef, value: Attribute) -> Constant {
    let op = OpBuilder::new(location, DIALECT_NAME(), CONSTANT())
        .result(ty)
        .attr(ATTR_VALUE(), value)
        .build(ctx);
    Constant(op)
}

// ============================================================================
// Elementwise binary operations
// ============================================================================

binary_op!("std", "addi" => Addi, addi);
binary_op!("std", "addf" => Addf, addf);
binary_op!("std", "subi" => Subi, subi);
binary_op!("std", "subf" => Subf, subf);
binary_op!("std", "muli" => Muli, muli);
binary_op!("std", "mulf" => Mulf, mulf);
binary_op!(
    /// Signed integer division, rounding toward zero.
    "std", "divi_signed" => DivISigned, divi_signed
);
binary_op!("std", "divf" => Divf, divf);
binary_op!(
    /// Signed integer remainder; the result takes the sign of the dividend.
    "std", "remi_signed" => RemISigned, remi_signed
);
binary_op!("std", "remf" => Remf, remf);
binary_op!("std", "and" => And, and);
