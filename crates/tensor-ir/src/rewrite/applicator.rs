//! Greedy fixed-point driver.
//!
//! A sweep visits every op nested under the root, finishing an op's regions
//! before offering the op itself to the patterns. Sweeps repeat until one
//! changes nothing or the iteration bound is reached.

use tracing::{debug, trace, warn};

use super::pattern::RewritePattern;
use super::rewriter::{self, PatternRewriter};
use crate::context::IrContext;
use crate::refs::{BlockRef, OpRef};

/// Outcome of [`PatternApplicator::apply_to_op`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyResult {
    /// Sweeps run, counting the final one that changed nothing.
    pub iterations: usize,
    pub total_changes: usize,
    pub reached_fixpoint: bool,
}

impl ApplyResult {
    /// Totals for two runs over disjoint roots.
    pub fn merge(self, other: ApplyResult) -> ApplyResult {
        ApplyResult {
            iterations: self.iterations.max(other.iterations),
            total_changes: self.total_changes + other.total_changes,
            reached_fixpoint: self.reached_fixpoint && other.reached_fixpoint,
        }
    }
}

/// An ordered rule set plus an iteration bound.
pub struct PatternApplicator {
    patterns: Vec<Box<dyn RewritePattern>>,
    max_iterations: usize,
}

impl Default for PatternApplicator {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternApplicator {
    pub const DEFAULT_MAX_ITERATIONS: usize = 10;

    pub fn new() -> Self {
        Self {
            patterns: Vec::new(),
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Earlier patterns win when several match the same op.
    pub fn add_pattern(mut self, pattern: impl RewritePattern + 'static) -> Self {
        self.patterns.push(Box::new(pattern));
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn pattern_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.patterns.iter().map(|p| p.name())
    }

    /// Rewrite everything nested in `root` to a fixed point. `root` itself
    /// is never offered to the patterns.
    pub fn apply_to_op(&self, ctx: &mut IrContext, root: OpRef) -> ApplyResult {
        let mut result = ApplyResult::default();
        while result.iterations < self.max_iterations {
            result.iterations += 1;
            let changes = self.sweep_nested(ctx, root);
            trace!(sweep = result.iterations, changes, "rewrite sweep");
            result.total_changes += changes;
            if changes == 0 {
                result.reached_fixpoint = true;
                return result;
            }
        }
        warn!(
            max_iterations = self.max_iterations,
            total_changes = result.total_changes,
            "pattern application did not reach a fixed point"
        );
        result
    }

    fn sweep_nested(&self, ctx: &mut IrContext, holder: OpRef) -> usize {
        let mut changes = 0;
        for region in ctx.op(holder).regions.clone() {
            for block in ctx.region(region).blocks.clone() {
                changes += self.sweep_block(ctx, block);
            }
        }
        changes
    }

    fn sweep_block(&self, ctx: &mut IrContext, block: BlockRef) -> usize {
        let mut changes = 0;
        for op in ctx.block(block).ops.clone() {
            // Replaced earlier in this sweep.
            if ctx.op(op).parent != Some(block) {
                continue;
            }
            changes += self.sweep_nested(ctx, op);
            if ctx.op(op).parent == Some(block) && self.rewrite(ctx, op) {
                changes += 1;
            }
        }
        changes
    }

    fn rewrite(&self, ctx: &mut IrContext, op: OpRef) -> bool {
        for pattern in &self.patterns {
            let mut rewriter = PatternRewriter::new();
            if !pattern.match_and_rewrite(ctx, op, &mut rewriter) {
                continue;
            }
            let Some(replacement) = rewriter.into_replacement() else {
                continue;
            };
            let data = ctx.op(op);
            debug!(
                pattern = pattern.name(),
                dialect = %data.dialect,
                op = %data.name,
                "applied rewrite"
            );
            rewriter::splice(ctx, op, replacement);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::OpBuilder;
    use crate::parser::{parse_core_module, parse_module};
    use crate::printer::print_module;
    use crate::symbol::Symbol;
    use insta::assert_snapshot;

    /// `test.source` becomes `test.target` with the same operands and types.
    struct RenamePattern;

    impl RewritePattern for RenamePattern {
        fn match_and_rewrite(
            &self,
            ctx: &mut IrContext,
            op: OpRef,
            rewriter: &mut PatternRewriter,
        ) -> bool {
            let data = ctx.op(op);
            if data.dialect != "test" || data.name != "source" {
                return false;
            }
            let builder = OpBuilder::new(data.location, Symbol::new("test"), Symbol::new("target"))
                .operands(ctx.op_operands(op).iter().copied())
                .results(ctx.op_result_types(op).iter().copied());
            rewriter.replace_op(builder.build(ctx));
            true
        }
    }

    /// Swaps `test.ping` and `test.pong` forever.
    struct Flipper;

    impl RewritePattern for Flipper {
        fn match_and_rewrite(
            &self,
            ctx: &mut IrContext,
            op: OpRef,
            rewriter: &mut PatternRewriter,
        ) -> bool {
            let data = ctx.op(op);
            if data.dialect != "test" {
                return false;
            }
            let next = if data.name == "ping" { "pong" } else { "ping" };
            let flipped = OpBuilder::new(data.location, Symbol::new("test"), Symbol::new(next))
                .build(ctx);
            rewriter.replace_op(flipped);
            true
        }
    }

    /// Claims every op without choosing a replacement.
    struct Inert;

    impl RewritePattern for Inert {
        fn match_and_rewrite(&self, _: &mut IrContext, _: OpRef, _: &mut PatternRewriter) -> bool {
            true
        }
    }

    const SOURCE: &str = r#"core.module @m {
  func.func @f(%0: core.i32) -> core.i32 {
    %1 = test.source %0 : core.i32
    %2 = test.use %1 : core.i32
    func.return %2
  }
}"#;

    #[test]
    fn renames_nested_op_and_redirects_uses() {
        let mut ctx = IrContext::new();
        let module = parse_core_module(&mut ctx, SOURCE).unwrap();

        let result = PatternApplicator::new()
            .add_pattern(RenamePattern)
            .apply_to_op(&mut ctx, module.op_ref());

        assert_eq!(
            result,
            ApplyResult {
                iterations: 2,
                total_changes: 1,
                reached_fixpoint: true,
            }
        );
        assert_snapshot!(print_module(&ctx, module.op_ref()), @r"
        core.module @m {
          func.func @f(%0: core.i32) -> core.i32 {
            %1 = test.target %0 : core.i32
            %2 = test.use %1 : core.i32
            func.return %2
          }
        }
        ");
    }

    #[test]
    fn stops_at_iteration_bound() {
        let mut ctx = IrContext::new();
        let module = parse_core_module(&mut ctx, "core.module @m {\n  test.ping\n}").unwrap();

        let result = PatternApplicator::new()
            .add_pattern(Flipper)
            .with_max_iterations(3)
            .apply_to_op(&mut ctx, module.op_ref());

        assert_eq!(result.iterations, 3);
        assert_eq!(result.total_changes, 3);
        assert!(!result.reached_fixpoint);
        assert_eq!(ctx.op(module.ops(&ctx)[0]).name, "pong");
    }

    #[test]
    fn a_match_without_replacement_falls_through() {
        let mut ctx = IrContext::new();
        let module = parse_core_module(&mut ctx, SOURCE).unwrap();

        let applicator = PatternApplicator::new()
            .add_pattern(Inert)
            .add_pattern(RenamePattern);
        let result = applicator.apply_to_op(&mut ctx, module.op_ref());
        assert_eq!(result.total_changes, 1);

        let names: Vec<_> = applicator.pattern_names().collect();
        assert!(names[0].ends_with("Inert"));
        assert!(names[1].ends_with("RenamePattern"));
    }

    #[test]
    fn root_op_is_not_rewritten() {
        let mut ctx = IrContext::new();
        let root = parse_module(&mut ctx, "test.outer {\n  test.ping\n}").unwrap();
        let result = PatternApplicator::new()
            .add_pattern(Flipper)
            .with_max_iterations(1)
            .apply_to_op(&mut ctx, root);

        assert_eq!(result.total_changes, 1);
        assert_eq!(ctx.op(root).name, "outer");
        let inner = ctx.region(ctx.op(root).regions[0]).blocks[0];
        assert_eq!(ctx.op(ctx.block(inner).ops[0]).name, "pong");
    }

    #[test]
    fn merge_combines_statistics() {
        let a = ApplyResult {
            iterations: 2,
            total_changes: 3,
            reached_fixpoint: true,
        };
        let b = ApplyResult {
            iterations: 4,
            total_changes: 1,
            reached_fixpoint: false,
        };
        assert_eq!(
            a.merge(b),
            ApplyResult {
                iterations: 4,
                total_changes: 4,
                reached_fixpoint: false,
            }
        );
    }
}
