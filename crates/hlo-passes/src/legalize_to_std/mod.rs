//! `xla-legalize-to-std`: lower `xla_hlo` ops to the `std` dialect.
//!
//! The rule set is, in registration order:
//! - the table-driven elementwise rules in [`generated`]
//!   (`add`, `sub`, `mul`, `div`, `rem`, `and`),
//! - [`CompareFConvert`] and [`CompareIConvert`] for `xla_hlo.compare`,
//! - [`ConvertIotaOp`], which materializes an integer iota as a dense
//!   `std.constant`.
//!
//! Every rule declines unless its operands are tensors of identical shape;
//! broadcasting forms are left for other passes.
//!
//! ## Example
//!
//! ```text
//! %2 = xla_hlo.compare %0, %1 {comparison_direction = "NE"} : core.tensor(core.i1) {shape = [4]}
//! ```
//!
//! with `f32` operands becomes
//!
//! ```text
//! %2 = std.cmpf %0, %1 {predicate = @une} : core.tensor(core.i1) {shape = [4]}
//! ```

pub mod compare;
pub mod generated;
pub mod iota;
pub mod predicates;

pub use compare::{CompareFConvert, CompareIConvert};
pub use iota::{ConvertIotaOp, iota_values};
pub use predicates::ComparisonDirection;

use tensor_ir::dialect::core::Module;
use tensor_ir::dialect::{func, hlo};
use tensor_ir::rewrite::{ApplyResult, ConversionTarget, Legality, PatternApplicator};
use tensor_ir::{DialectOp, IrContext, TypeRef, shaped};

pub const PASS_NAME: &str = "xla-legalize-to-std";
pub const PASS_DESCRIPTION: &str = "Legalize from XLA dialect to standard dialect";

/// Both types are tensors with identical extents.
pub(crate) fn same_shape(ctx: &IrContext, lhs: TypeRef, rhs: TypeRef) -> bool {
    match (shaped::shape(ctx, lhs), shaped::shape(ctx, rhs)) {
        (Some(l), Some(r)) => l == r,
        _ => false,
    }
}

/// Register the full rule set on `applicator`.
pub fn populate_patterns(applicator: PatternApplicator) -> PatternApplicator {
    generated::populate(applicator)
        .add_pattern(CompareFConvert)
        .add_pattern(CompareIConvert)
        .add_pattern(ConvertIotaOp)
}

/// An applicator carrying the full rule set and the default iteration bound.
pub fn applicator() -> PatternApplicator {
    populate_patterns(PatternApplicator::new())
}

/// Target under which no `xla_hlo` op may remain.
pub fn conversion_target() -> ConversionTarget {
    ConversionTarget::new().with_dialect(hlo::DIALECT_NAME(), Legality::Illegal)
}

/// Rewrite the body of one function to a fixed point.
pub fn run_on_function(ctx: &mut IrContext, function: func::Func) -> ApplyResult {
    run_on_function_with(ctx, &applicator(), function)
}

pub fn run_on_function_with(
    ctx: &mut IrContext,
    applicator: &PatternApplicator,
    function: func::Func,
) -> ApplyResult {
    let result = applicator.apply_to_op(ctx, function.op_ref());
    tracing::debug!(
        function = %function.sym_name(ctx),
        iterations = result.iterations,
        changes = result.total_changes,
        "legalized function"
    );
    result
}

/// Run the pass on every `func.func` of `module`.
pub fn lower(ctx: &mut IrContext, module: Module) -> ApplyResult {
    lower_with(ctx, &applicator(), module)
}

pub fn lower_with(ctx: &mut IrContext, applicator: &PatternApplicator, module: Module) -> ApplyResult {
    let mut result = ApplyResult {
        reached_fixpoint: true,
        ..ApplyResult::default()
    };
    for op in module.ops(ctx) {
        if let Ok(function) = func::Func::from_op(ctx, op) {
            result = result.merge(run_on_function_with(ctx, applicator, function));
        }
    }
    result
}
