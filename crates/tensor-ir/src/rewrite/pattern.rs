use super::rewriter::PatternRewriter;
use crate::context::IrContext;
use crate::refs::OpRef;

/// A local rewrite of a single op.
///
/// On a match the pattern builds the replacement detached (through
/// [`OpBuilder::build`](crate::context::OpBuilder::build)), hands it to
/// `rewriter` and returns `true`. On a miss it returns `false` and leaves the
/// IR as it was.
pub trait RewritePattern {
    fn match_and_rewrite(
        &self,
        ctx: &mut IrContext,
        op: OpRef,
        rewriter: &mut PatternRewriter,
    ) -> bool;

    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
