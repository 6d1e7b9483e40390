//! Pre-order traversal of nested ops.

use crate::context::IrContext;
use crate::refs::{OpRef, RegionRef};

/// Every op nested in a region, parents before their children and siblings
/// in block order.
pub struct Preorder<'a> {
    ctx: &'a IrContext,
    pending: Vec<OpRef>,
}

impl<'a> Preorder<'a> {
    pub fn new(ctx: &'a IrContext, region: RegionRef) -> Self {
        let mut walk = Self {
            ctx,
            pending: Vec::new(),
        };
        walk.schedule(region);
        walk
    }

    /// Queue the ops of `region` so that its first op pops next.
    fn schedule(&mut self, region: RegionRef) {
        let ctx = self.ctx;
        for &block in ctx.region(region).blocks.iter().rev() {
            self.pending.extend(ctx.block(block).ops.iter().rev());
        }
    }
}

impl Iterator for Preorder<'_> {
    type Item = OpRef;

    fn next(&mut self) -> Option<OpRef> {
        let op = self.pending.pop()?;
        let ctx = self.ctx;
        for &region in ctx.op(op).regions.iter().rev() {
            self.schedule(region);
        }
        Some(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{core, func, standard};
    use crate::location::Location;
    use crate::shaped;
    use crate::symbol::Symbol;
    use crate::types::Attribute;

    /// `{ module { func @f { c0; c1; return } func @g { c0; return } } }`
    fn nested_module(ctx: &mut IrContext) -> RegionRef {
        let loc = Location::synthetic();
        let i32_ty = shaped::int_type(ctx, 32);
        let module_block = ctx.create_block(&[]);
        for (name, consts) in [("f", 2), ("g", 1)] {
            let block = ctx.create_block(&[]);
            for i in 0..consts {
                let c = standard::constant(ctx, loc, i32_ty, Attribute::IntBits(i));
                ctx.push_op(block, c.op_ref());
            }
            let ret = func::r#return(ctx, loc, []);
            ctx.push_op(block, ret.op_ref());
            let body = ctx.create_region([block]);
            let signature = func::function_type(ctx, &[], None);
            let f = func::func(ctx, loc, Symbol::from_dynamic(name), signature, body);
            ctx.push_op(module_block, f.op_ref());
        }
        let module_body = ctx.create_region([module_block]);
        let module = core::module(ctx, loc, Symbol::new("m"), module_body);
        let outer = ctx.create_block(&[]);
        ctx.push_op(outer, module.op_ref());
        ctx.create_region([outer])
    }

    fn describe(ctx: &IrContext, op: OpRef) -> String {
        let data = ctx.op(op);
        match ctx.op_attr(op, Symbol::new("sym_name")).and_then(Attribute::as_symbol) {
            Some(name) => format!("{}.{} @{name}", data.dialect, data.name),
            None => format!("{}.{}", data.dialect, data.name),
        }
    }

    #[test]
    fn parents_come_before_children() {
        let mut ctx = IrContext::new();
        let region = nested_module(&mut ctx);

        let order: Vec<String> = Preorder::new(&ctx, region)
            .map(|op| describe(&ctx, op))
            .collect();
        assert_eq!(
            order,
            [
                "core.module @m",
                "func.func @f",
                "std.constant",
                "std.constant",
                "func.return",
                "func.func @g",
                "std.constant",
                "func.return",
            ]
        );
    }

    #[test]
    fn empty_region_yields_nothing() {
        let mut ctx = IrContext::new();
        let block = ctx.create_block(&[]);
        let region = ctx.create_region([block]);
        assert_eq!(Preorder::new(&ctx, region).count(), 0);
    }
}
