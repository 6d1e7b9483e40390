//! `xla_hlo.compare` to `std.cmpi` / `std.cmpf`.

use tensor_ir::dialect::{hlo, standard};
use tensor_ir::rewrite::{PatternRewriter, RewritePattern};
use tensor_ir::shaped::{self, ElementCategory};
use tensor_ir::{DialectOp, IrContext, OpRef};

use super::{predicates, same_shape};

/// Operands of a compare that both rules may lower: identical shapes and a
/// common element category.
fn compare_operands(ctx: &IrContext, op: OpRef) -> Option<(hlo::Compare, ElementCategory)> {
    let cmp = hlo::Compare::from_op(ctx, op).ok()?;
    let lhs_ty = ctx.value_ty(cmp.lhs(ctx));
    let rhs_ty = ctx.value_ty(cmp.rhs(ctx));

    // Broadcasting is not handled here.
    if !same_shape(ctx, lhs_ty, rhs_ty) {
        return None;
    }
    let lhs_category = shaped::element_category(ctx, lhs_ty);
    let rhs_category = shaped::element_category(ctx, rhs_ty);
    match (lhs_category, rhs_category) {
        (ElementCategory::Integer(_), ElementCategory::Integer(_)) => Some((cmp, lhs_category)),
        (ElementCategory::Float, ElementCategory::Float) => Some((cmp, lhs_category)),
        _ => None,
    }
}

/// Integer compare to `std.cmpi` with a signed predicate.
pub struct CompareIConvert;

impl RewritePattern for CompareIConvert {
    fn match_and_rewrite(
        &self,
        ctx: &mut IrContext,
        op: OpRef,
        rewriter: &mut PatternRewriter,
    ) -> bool {
        let Some((cmp, category)) = compare_operands(ctx, op) else {
            return false;
        };
        if !category.is_integer() {
            return false;
        }
        let Ok(direction) = cmp.comparison_direction(ctx) else {
            return false;
        };
        let Some(predicate) = predicates::int_predicate(direction) else {
            tracing::debug!(direction, "unsupported integer comparison direction");
            return false;
        };

        let location = ctx.op(op).location;
        let (lhs, rhs, result_ty) = (cmp.lhs(ctx), cmp.rhs(ctx), cmp.result_ty(ctx));
        let new_op = standard::cmpi(ctx, location, predicate, lhs, rhs, result_ty);
        rewriter.replace_op(new_op.op_ref());
        true
    }

    fn name(&self) -> &'static str {
        "CompareIConvert"
    }
}

/// Float compare to `std.cmpf`.
pub struct CompareFConvert;

impl RewritePattern for CompareFConvert {
    fn match_and_rewrite(
        &self,
        ctx: &mut IrContext,
        op: OpRef,
        rewriter: &mut PatternRewriter,
    ) -> bool {
        let Some((cmp, category)) = compare_operands(ctx, op) else {
            return false;
        };
        if !category.is_float() {
            return false;
        }
        let Ok(direction) = cmp.comparison_direction(ctx) else {
            return false;
        };
        let Some(predicate) = predicates::float_predicate(direction) else {
            tracing::debug!(direction, "unsupported float comparison direction");
            return false;
        };

        let location = ctx.op(op).location;
        let (lhs, rhs, result_ty) = (cmp.lhs(ctx), cmp.rhs(ctx), cmp.result_ty(ctx));
        let new_op = standard::cmpf(ctx, location, predicate, lhs, rhs, result_ty);
        rewriter.replace_op(new_op.op_ref());
        true
    }

    fn name(&self) -> &'static str {
        "CompareFConvert"
    }
}
