//! Table-driven lowering of elementwise `xla_hlo` arithmetic.
//!
//! | hlo op | integer operands    | float operands |
//! |--------|---------------------|----------------|
//! | add    | `std.addi`          | `std.addf`     |
//! | sub    | `std.subi`          | `std.subf`     |
//! | mul    | `std.muli`          | `std.mulf`     |
//! | div    | `std.divi_signed`   | `std.divf`     |
//! | rem    | `std.remi_signed`   | `std.remf`     |
//! | and    | `std.and` (`i1`)    |                |
//!
//! A rule applies only when both operands have the same shape and no
//! `broadcast_dimensions` attribute is present.

use tensor_ir::dialect::{hlo, standard};
use tensor_ir::rewrite::{PatternApplicator, PatternRewriter, RewritePattern};
use tensor_ir::shaped::{self, ElementCategory};
use tensor_ir::{DialectOp, IrContext, Location, OpRef, Symbol, TypeRef, ValueRef};

use super::same_shape;

type BuildFn = fn(&mut IrContext, Location, ValueRef, ValueRef, TypeRef) -> OpRef;

/// Adapt a `std` binary constructor to [`BuildFn`].
macro_rules! build {
    ($ctor:path) => {{
        fn build(
            ctx: &mut IrContext,
            location: Location,
            lhs: ValueRef,
            rhs: ValueRef,
            ty: TypeRef,
        ) -> OpRef {
            $ctor(ctx, location, lhs, rhs, ty).op_ref()
        }
        build as BuildFn
    }};
}

/// One row of the lowering table.
pub struct ElementwiseRule {
    name: &'static str,
    source: &'static str,
    int: Option<BuildFn>,
    float: Option<BuildFn>,
    /// Restrict the integer lowering to `i1` operands.
    predicate_only: bool,
}

pub static RULES: [ElementwiseRule; 6] = [
    ElementwiseRule {
        name: "LowerAdd",
        source: <hlo::Add as DialectOp>::OP_NAME,
        int: Some(build!(standard::addi)),
        float: Some(build!(standard::addf)),
        predicate_only: false,
    },
    ElementwiseRule {
        name: "LowerSub",
        source: <hlo::Sub as DialectOp>::OP_NAME,
        int: Some(build!(standard::subi)),
        float: Some(build!(standard::subf)),
        predicate_only: false,
    },
    ElementwiseRule {
        name: "LowerMul",
        source: <hlo::Mul as DialectOp>::OP_NAME,
        int: Some(build!(standard::muli)),
        float: Some(build!(standard::mulf)),
        predicate_only: false,
    },
    ElementwiseRule {
        name: "LowerDiv",
        source: <hlo::Div as DialectOp>::OP_NAME,
        int: Some(build!(standard::divi_signed)),
        float: Some(build!(standard::divf)),
        predicate_only: false,
    },
    ElementwiseRule {
        name: "LowerRem",
        source: <hlo::Rem as DialectOp>::OP_NAME,
        int: Some(build!(standard::remi_signed)),
        float: Some(build!(standard::remf)),
        predicate_only: false,
    },
    ElementwiseRule {
        name: "LowerAnd",
        source: <hlo::And as DialectOp>::OP_NAME,
        int: Some(build!(standard::and)),
        float: None,
        predicate_only: true,
    },
];

/// Pattern for one [`ElementwiseRule`].
pub struct LowerElementwise {
    rule: &'static ElementwiseRule,
}

impl LowerElementwise {
    pub fn new(rule: &'static ElementwiseRule) -> Self {
        Self { rule }
    }

    fn builder(&self, ctx: &IrContext, lhs_ty: TypeRef, rhs_ty: TypeRef) -> Option<BuildFn> {
        let lhs = shaped::element_category(ctx, lhs_ty);
        let rhs = shaped::element_category(ctx, rhs_ty);
        match (lhs, rhs) {
            (ElementCategory::Integer(a), ElementCategory::Integer(b)) => {
                if self.rule.predicate_only && (a != 1 || b != 1) {
                    return None;
                }
                self.rule.int
            }
            (ElementCategory::Float, ElementCategory::Float) => self.rule.float,
            _ => None,
        }
    }
}

impl RewritePattern for LowerElementwise {
    fn match_and_rewrite(
        &self,
        ctx: &mut IrContext,
        op: OpRef,
        rewriter: &mut PatternRewriter,
    ) -> bool {
        let data = ctx.op(op);
        if data.dialect != hlo::DIALECT_NAME() || data.name != Symbol::new(self.rule.source) {
            return false;
        }
        let operands = ctx.op_operands(op);
        let result_types = ctx.op_result_types(op);
        let (&[lhs, rhs], &[result_ty]) = (operands, result_types) else {
            return false;
        };
        if hlo::broadcast_dimensions(ctx, op).is_some() {
            return false;
        }

        let (lhs_ty, rhs_ty) = (ctx.value_ty(lhs), ctx.value_ty(rhs));
        if !same_shape(ctx, lhs_ty, rhs_ty) {
            return false;
        }
        let Some(build) = self.builder(ctx, lhs_ty, rhs_ty) else {
            return false;
        };

        let location = data.location;
        let new_op = build(ctx, location, lhs, rhs, result_ty);
        rewriter.replace_op(new_op);
        true
    }

    fn name(&self) -> &'static str {
        self.rule.name
    }
}

/// Register every elementwise rule, in table order.
pub fn populate(applicator: PatternApplicator) -> PatternApplicator {
    RULES
        .iter()
        .fold(applicator, |applicator, rule| {
            applicator.add_pattern(LowerElementwise::new(rule))
        })
}
