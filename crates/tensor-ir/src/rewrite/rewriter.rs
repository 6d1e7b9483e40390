//! Replacement hand-off between a pattern and the applicator.

use smallvec::SmallVec;

use crate::context::IrContext;
use crate::refs::{OpRef, ValueRef};

/// Holds the replacement a pattern chose for the op it matched. The IR is
/// only changed after the pattern returns.
#[derive(Default)]
pub struct PatternRewriter {
    replacement: Option<OpRef>,
}

impl PatternRewriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Replace the matched op with the detached `new_op`. Results are
    /// redirected by position, so both ops need the same result count.
    pub fn replace_op(&mut self, new_op: OpRef) {
        debug_assert!(self.replacement.is_none(), "replace_op called twice");
        self.replacement = Some(new_op);
    }

    pub(crate) fn into_replacement(self) -> Option<OpRef> {
        self.replacement
    }
}

/// Put `new_op` in `old`'s place, move every use over and erase `old`.
pub(crate) fn splice(ctx: &mut IrContext, old: OpRef, new_op: OpRef) {
    ctx.insert_before(old, new_op);
    let from: SmallVec<[ValueRef; 1]> = ctx.op_results(old).into();
    let to: SmallVec<[ValueRef; 1]> = ctx.op_results(new_op).into();
    assert_eq!(
        from.len(),
        to.len(),
        "replacement for {old} has a different result count"
    );
    for (old_value, new_value) in from.into_iter().zip(to) {
        ctx.replace_all_uses(old_value, new_value);
    }
    ctx.erase_op(old);
}
