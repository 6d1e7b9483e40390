//! Dialect definitions.
//!
//! - `core`: the module container and the builtin scalar/tensor types
//! - `func`: functions and returns
//! - `hlo`: the `xla_hlo` tensor dialect
//! - `standard`: the `std` scalar/elementwise arithmetic dialect

pub mod core;
pub mod func;
pub mod hlo;
pub mod standard;

#[cfg(test)]
mod tests {
    use crate::ops::DialectOp;
    use crate::shaped::{float_type, int_type, tensor_type};
    use crate::{Attribute, IrContext, Location, Symbol, ValueDef};

    use super::{hlo, standard};

    fn dummy_location() -> Location {
        Location::synthetic()
    }

    // ================================================================
    // Basic constructor -> from_op -> accessor round-trip
    // ================================================================

    #[test]
    fn test_constant_round_trip() {
        let mut ctx = IrContext::new();
        let loc = dummy_location();
        let i32_ty = int_type(&mut ctx, 32);
        let t = tensor_type(&mut ctx, i32_ty, &[2]);
        let value = Attribute::List(vec![Attribute::IntBits(4), Attribute::IntBits(5)]);

        let op = standard::constant(&mut ctx, loc, t, value.clone());
        let op2 = standard::Constant::from_op(&ctx, op.op_ref()).expect("should match std.constant");
        assert_eq!(op.op_ref(), op2.op_ref());
        assert_eq!(op.value(&ctx), &value);
        assert_eq!(ctx.value_ty(op.result(&ctx)), t);

        let dense = op.dense_int_elements(&ctx).expect("integer constant");
        assert_eq!(dense.iter_signed().collect::<Vec<_>>(), vec![4, 5]);
    }

    #[test]
    fn test_compare_attributes() {
        let mut ctx = IrContext::new();
        let loc = dummy_location();
        let f32_ty = float_type(&mut ctx, "f32");
        let i1 = int_type(&mut ctx, 1);
        let t = tensor_type(&mut ctx, f32_ty, &[3]);
        let pred_t = tensor_type(&mut ctx, i1, &[3]);

        let c = standard::constant(&mut ctx, loc, t, Attribute::List(vec![]));
        let v = c.result(&ctx);
        let cmp = hlo::compare(&mut ctx, loc, v, v, pred_t, "GE");

        assert_eq!(cmp.lhs(&ctx), v);
        assert_eq!(cmp.rhs(&ctx), v);
        assert_eq!(cmp.comparison_direction(&ctx), Ok("GE"));
        assert_eq!(cmp.result_ty(&ctx), pred_t);
    }

    #[test]
    fn test_iota_dimension() {
        let mut ctx = IrContext::new();
        let loc = dummy_location();
        let i32_ty = int_type(&mut ctx, 32);
        let t = tensor_type(&mut ctx, i32_ty, &[2, 3]);

        let iota = hlo::iota(&mut ctx, loc, t, 1);
        assert_eq!(iota.iota_dimension(&ctx), Ok(1));
        assert!(ctx.op_operands(iota.op_ref()).is_empty());
    }

    #[test]
    fn test_cmp_predicates_stored_as_symbols() {
        let mut ctx = IrContext::new();
        let loc = dummy_location();
        let i32_ty = int_type(&mut ctx, 32);
        let i1 = int_type(&mut ctx, 1);
        let c = standard::constant(&mut ctx, loc, i32_ty, Attribute::IntBits(0));
        let v = c.result(&ctx);

        let cmpi = standard::cmpi(&mut ctx, loc, standard::CmpIPredicate::Sle, v, v, i1);
        assert_eq!(
            ctx.op_attr(cmpi.op_ref(), Symbol::new("predicate")),
            Some(&Attribute::Symbol(Symbol::new("sle")))
        );
        assert_eq!(cmpi.predicate(&ctx), Ok(standard::CmpIPredicate::Sle));

        let cmpf = standard::cmpf(&mut ctx, loc, standard::CmpFPredicate::Une, v, v, i1);
        assert_eq!(cmpf.predicate(&ctx), Ok(standard::CmpFPredicate::Une));
    }

    #[test]
    fn test_binary_op_accessors() {
        let mut ctx = IrContext::new();
        let loc = dummy_location();
        let i32_ty = int_type(&mut ctx, 32);
        let a = standard::constant(&mut ctx, loc, i32_ty, Attribute::IntBits(1)).result(&ctx);
        let b = standard::constant(&mut ctx, loc, i32_ty, Attribute::IntBits(2)).result(&ctx);

        let add = hlo::add(&mut ctx, loc, a, b, i32_ty);
        assert_eq!(add.lhs(&ctx), a);
        assert_eq!(add.rhs(&ctx), b);
        assert_eq!(add.result_ty(&ctx), i32_ty);
        assert!(hlo::broadcast_dimensions(&ctx, add.op_ref()).is_none());

        let addi = standard::addi(&mut ctx, loc, a, b, i32_ty);
        assert!(standard::Addi::matches(&ctx, addi.op_ref()));
        assert!(!hlo::Add::matches(&ctx, addi.op_ref()));
    }

    // ================================================================
    // from_op failures
    // ================================================================

    #[test]
    fn test_from_op_wrong_dialect() {
        let mut ctx = IrContext::new();
        let loc = dummy_location();
        let i32_ty = int_type(&mut ctx, 32);
        let c = standard::constant(&mut ctx, loc, i32_ty, Attribute::IntBits(1));

        let err = hlo::Iota::from_op(&ctx, c.op_ref()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "expected operation xla_hlo.iota, found std.constant"
        );
    }

    #[test]
    fn test_result_value_def() {
        let mut ctx = IrContext::new();
        let loc = dummy_location();
        let i32_ty = int_type(&mut ctx, 32);
        let c = standard::constant(&mut ctx, loc, i32_ty, Attribute::IntBits(42));

        match ctx.value_def(c.result(&ctx)) {
            ValueDef::OpResult(op, idx) => {
                assert_eq!(op, c.op_ref());
                assert_eq!(idx, 0);
            }
            _ => panic!("expected OpResult"),
        }
    }

    #[test]
    fn test_dialect_name_and_op_name() {
        assert_eq!(hlo::Compare::DIALECT_NAME, "xla_hlo");
        assert_eq!(hlo::Iota::OP_NAME, "iota");
        assert_eq!(standard::Cmpf::DIALECT_NAME, "std");
        assert_eq!(standard::DivISigned::OP_NAME, "divi_signed");
        assert_eq!(hlo::DIALECT_NAME(), Symbol::new("xla_hlo"));
        assert_eq!(standard::DIALECT_NAME(), Symbol::new("std"));
    }
}
