//! `xla_hlo.iota` to a dense `std.constant`.

use tensor_ir::dialect::{hlo, standard};
use tensor_ir::rewrite::{PatternRewriter, RewritePattern};
use tensor_ir::shaped::{self, DenseIntElements};
use tensor_ir::{DialectOp, IrContext, OpRef};

/// Number of elements of `shape`, or `None` if it does not fit in `usize`.
fn element_count(shape: &[u64]) -> Option<usize> {
    if shape.contains(&0) {
        return Some(0);
    }
    let total = shape.iter().try_fold(1u64, |acc, &d| acc.checked_mul(d))?;
    usize::try_from(total).ok()
}

/// Values of an integer iota of `shape` counting along `dimension`, in
/// row-major order, truncated to `bitwidth` bits.
///
/// Element `i` is `(i / stride) % shape[dimension]`, where `stride` is the
/// product of the extents after `dimension`. Returns `None` when the element
/// count overflows.
///
/// # Panics
///
/// Panics if `dimension >= shape.len()`.
pub fn iota_values(shape: &[u64], dimension: usize, bitwidth: u32) -> Option<DenseIntElements> {
    let total = element_count(shape)?;
    let mut values = DenseIntElements::with_capacity(bitwidth, total);
    if total == 0 {
        return Some(values);
    }

    let total = total as u64;
    let stride = shape[..=dimension].iter().fold(total, |acc, &d| acc / d);
    let extent = shape[dimension];
    for i in 0..total {
        values.push((i / stride) % extent);
    }
    Some(values)
}

/// Integer iota to `std.constant`. Float and other element types are left
/// alone.
pub struct ConvertIotaOp;

impl RewritePattern for ConvertIotaOp {
    fn match_and_rewrite(
        &self,
        ctx: &mut IrContext,
        op: OpRef,
        rewriter: &mut PatternRewriter,
    ) -> bool {
        let Ok(iota) = hlo::Iota::from_op(ctx, op) else {
            return false;
        };
        let result_ty = iota.result_ty(ctx);
        let Some(bitwidth) = shaped::integer_width(ctx, result_ty) else {
            return false;
        };
        let Some(shape) = shaped::shape(ctx, result_ty) else {
            tracing::warn!("xla_hlo.iota result is not a ranked tensor");
            return false;
        };
        let dimension = match iota.iota_dimension(ctx) {
            Ok(d) => d,
            Err(err) => {
                tracing::warn!(%err, "malformed xla_hlo.iota");
                return false;
            }
        };
        let Some(dimension) = usize::try_from(dimension)
            .ok()
            .filter(|&d| d < shape.len())
        else {
            tracing::warn!(
                dimension,
                rank = shape.len(),
                "xla_hlo.iota dimension out of range"
            );
            return false;
        };
        let Some(values) = iota_values(&shape, dimension, bitwidth) else {
            tracing::warn!(?shape, "xla_hlo.iota is too large to materialize");
            return false;
        };

        let location = ctx.op(op).location;
        let constant = standard::constant(ctx, location, result_ty, values.to_attribute());
        rewriter.replace_op(constant.op_ref());
        true
    }

    fn name(&self) -> &'static str {
        "ConvertIotaOp"
    }
}
