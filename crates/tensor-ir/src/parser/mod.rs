//! Reading the text form back into an [`IrContext`].
//!
//! [`syntax`] turns text into trees that still refer to everything by name.
//! The [`Resolver`] then builds ops bottom-up, binding `%names` to values.
//! A name is visible from its definition to the end of the region that
//! defines it, and may not be redefined while visible.

mod syntax;

use std::collections::{HashMap, HashSet};

use derive_more::{Display, Error};

use crate::context::{IrContext, OpBuilder};
use crate::dialect::{core, func};
use crate::location::{Location, Span};
use crate::ops::DialectOp;
use crate::refs::{OpRef, RegionRef, TypeRef, ValueRef};
use crate::symbol::Symbol;
use crate::types::{Attribute, TypeData};

use syntax::{AttrSyntax, OpSyntax, RegionSyntax, TypeSyntax};

#[derive(Clone, Debug, PartialEq, Eq, Display, Error)]
#[display("parse error at offset {offset}: {message}")]
pub struct ParseError {
    pub message: String,
    pub offset: usize,
}

/// Parse one top-level operation, normally a `core.module`.
pub fn parse_module(ctx: &mut IrContext, input: &str) -> Result<OpRef, ParseError> {
    parse_source(ctx, "<input>", input)
}

/// [`parse_module`] with `path` recorded in every op location.
pub fn parse_source(ctx: &mut IrContext, path: &str, input: &str) -> Result<OpRef, ParseError> {
    let mut rest = input;
    let syntax_error = |rest: &str, err: winnow::error::ErrMode<_>| ParseError {
        message: format!("syntax error: {err}"),
        offset: input.len() - rest.len(),
    };
    let op = syntax::operation(&mut rest).map_err(|err| syntax_error(rest, err))?;
    syntax::skip(&mut rest).map_err(|err| syntax_error(rest, err))?;
    if !rest.is_empty() {
        return Err(ParseError {
            message: "trailing input after top-level operation".to_owned(),
            offset: input.len() - rest.len(),
        });
    }

    let mut resolver = Resolver {
        ctx,
        file: Symbol::from_dynamic(path),
        source_len: input.len(),
        scope: HashMap::new(),
        defined: Vec::new(),
    };
    resolver.operation(&op)
}

/// Parse a `core.module`; any other root op is an error.
pub fn parse_core_module(ctx: &mut IrContext, input: &str) -> Result<core::Module, ParseError> {
    parse_core_source(ctx, "<input>", input)
}

/// [`parse_core_module`] with `path` recorded in every op location.
pub fn parse_core_source(
    ctx: &mut IrContext,
    path: &str,
    input: &str,
) -> Result<core::Module, ParseError> {
    let op = parse_source(ctx, path, input)?;
    core::Module::from_op(ctx, op).map_err(|err| ParseError {
        message: err.to_string(),
        offset: 0,
    })
}

struct Resolver<'c, 's> {
    ctx: &'c mut IrContext,
    file: Symbol,
    source_len: usize,
    scope: HashMap<&'s str, ValueRef>,
    /// Names in definition order; regions truncate back to their start.
    defined: Vec<&'s str>,
}

type Params<'s> = [(&'s str, TypeSyntax<'s>)];

impl<'s> Resolver<'_, 's> {
    fn error(&self, op: &OpSyntax<'_>, message: String) -> ParseError {
        ParseError {
            message,
            offset: self.source_len - op.rest_len,
        }
    }

    fn lookup(&self, op: &OpSyntax<'_>, name: &str) -> Result<ValueRef, ParseError> {
        self.scope.get(name).copied().ok_or_else(|| {
            self.error(op, format!("undefined value '%{name}' in operation '{}.{}'", op.dialect, op.name))
        })
    }

    fn define(&mut self, op: &OpSyntax<'_>, name: &'s str, value: ValueRef) -> Result<(), ParseError> {
        if self.scope.insert(name, value).is_some() {
            return Err(self.error(op, format!("duplicate SSA name '%{name}'")));
        }
        self.defined.push(name);
        Ok(())
    }

    fn operation(&mut self, op: &OpSyntax<'s>) -> Result<OpRef, ParseError> {
        let operands = op
            .operands
            .iter()
            .map(|name| self.lookup(op, name))
            .collect::<Result<Vec<_>, _>>()?;
        if !op.results.is_empty() && op.results.len() != op.result_types.len() {
            return Err(self.error(
                op,
                format!(
                    "'{}.{}' declares {} result names but {} result types",
                    op.dialect,
                    op.name,
                    op.results.len(),
                    op.result_types.len()
                ),
            ));
        }

        let location = Location::new(self.file, Span::at(self.source_len - op.rest_len));
        let mut builder =
            OpBuilder::new(location, Symbol::from_dynamic(op.dialect), Symbol::from_dynamic(op.name))
                .operands(operands);
        for ty in &op.result_types {
            builder = builder.result(ty.intern(self.ctx));
        }
        for (key, value) in &op.attrs {
            builder = builder.attr(Symbol::from_dynamic(key), value.resolve(self.ctx));
        }
        if let Some(name) = &op.symbol {
            builder = builder.attr(core::ATTR_SYM_NAME(), Attribute::Symbol(Symbol::from_dynamic(name)));
        }
        let mut entry_params: &Params<'s> = &[];
        if let Some(signature) = &op.signature {
            let params: Vec<TypeRef> = signature.params.iter().map(|(_, ty)| ty.intern(self.ctx)).collect();
            let result = signature.result.as_ref().map(|ty| ty.intern(self.ctx));
            let ty = func::function_type(self.ctx, &params, result);
            builder = builder.attr(func::ATTR_TYPE(), Attribute::Type(ty));
            entry_params = &signature.params;
        }
        for (index, region) in op.regions.iter().enumerate() {
            let params = if index == 0 { entry_params } else { &[] };
            builder = builder.region(self.region(op, region, params)?);
        }

        let built = builder.build(self.ctx);
        for (index, &name) in op.results.iter().enumerate() {
            let value = self.ctx.op_result(built, index);
            self.define(op, name, value)?;
        }
        Ok(built)
    }

    /// `entry_params` become the entry block arguments of a function body.
    fn region(
        &mut self,
        owner: &OpSyntax<'s>,
        region: &RegionSyntax<'s>,
        entry_params: &Params<'s>,
    ) -> Result<RegionRef, ParseError> {
        let mark = self.defined.len();
        let built = self.region_in_scope(owner, region, entry_params);
        for name in self.defined.drain(mark..) {
            self.scope.remove(name);
        }
        built
    }

    fn region_in_scope(
        &mut self,
        owner: &OpSyntax<'s>,
        region: &RegionSyntax<'s>,
        entry_params: &Params<'s>,
    ) -> Result<RegionRef, ParseError> {
        // Blocks first, so their arguments are visible to ops in any block.
        let mut labels = HashSet::new();
        let mut blocks = Vec::with_capacity(region.blocks.len());
        for (index, block) in region.blocks.iter().enumerate() {
            if !labels.insert(block.label) {
                return Err(self.error(owner, format!("duplicate block label '^{}'", block.label)));
            }
            let args: &Params<'s> = if index == 0 && !entry_params.is_empty() {
                if !block.args.is_empty() {
                    return Err(self.error(
                        owner,
                        "entry block arguments are given by the function signature".to_owned(),
                    ));
                }
                entry_params
            } else {
                &block.args
            };
            let arg_types: Vec<TypeRef> = args.iter().map(|(_, ty)| ty.intern(self.ctx)).collect();
            let built = self.ctx.create_block(&arg_types);
            for (slot, &(name, _)) in args.iter().enumerate() {
                let value = self.ctx.block_arg(built, slot);
                self.define(owner, name, value)?;
            }
            blocks.push(built);
        }

        for (block, &built) in region.blocks.iter().zip(&blocks) {
            for op in &block.ops {
                let op = self.operation(op)?;
                self.ctx.push_op(built, op);
            }
        }
        Ok(self.ctx.create_region(blocks))
    }
}

impl TypeSyntax<'_> {
    fn intern(&self, ctx: &mut IrContext) -> TypeRef {
        let mut data = TypeData::new(Symbol::from_dynamic(self.dialect), Symbol::from_dynamic(self.name));
        for param in &self.params {
            data = data.with_param(param.intern(ctx));
        }
        for (key, value) in &self.attrs {
            data = data.with_attr(Symbol::from_dynamic(key), value.resolve(ctx));
        }
        ctx.types.intern(data)
    }
}

impl AttrSyntax<'_> {
    fn resolve(&self, ctx: &mut IrContext) -> Attribute {
        match self {
            AttrSyntax::Unit => Attribute::Unit,
            AttrSyntax::Bool(value) => Attribute::Bool(*value),
            AttrSyntax::Int(bits) => Attribute::IntBits(*bits),
            AttrSyntax::Float(value) => Attribute::FloatBits(value.to_bits()),
            AttrSyntax::String(text) => Attribute::String(text.clone()),
            AttrSyntax::Symbol(name) => Attribute::Symbol(Symbol::from_dynamic(name)),
            AttrSyntax::Type(ty) => Attribute::Type(ty.intern(ctx)),
            AttrSyntax::List(items) => Attribute::List(items.iter().map(|item| item.resolve(ctx)).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{hlo, standard};
    use crate::printer::print_module;
    use crate::shaped::{self, ElementCategory};
    use insta::assert_snapshot;

    /// Parse -> print -> parse -> print; both printed texts must match.
    fn assert_roundtrip(input: &str) -> String {
        let mut ctx = IrContext::new();
        let op = parse_module(&mut ctx, input).unwrap_or_else(|e| {
            panic!("parse failed at offset {}: {}\n\n{}", e.offset, e.message, input)
        });
        let printed = print_module(&ctx, op);

        let mut ctx2 = IrContext::new();
        let op2 = parse_module(&mut ctx2, &printed).unwrap_or_else(|e| {
            panic!("reparse failed at offset {}: {}\n\n{}", e.offset, e.message, printed)
        });
        let reprinted = print_module(&ctx2, op2);
        assert_eq!(printed, reprinted, "round-trip mismatch");
        printed
    }

    // ================================================================
    // Round trips
    // ================================================================

    #[test]
    fn test_roundtrip_renumbers_values() {
        let printed = assert_roundtrip(
            r#"core.module @test {
  func.func @lt(%a: core.tensor(core.i32) {shape = [2, 3]}, %b: core.tensor(core.i32) {shape = [2, 3]}) -> core.tensor(core.i1) {shape = [2, 3]} {
    %r = xla_hlo.compare %a, %b {comparison_direction = "LT"} : core.tensor(core.i1) {shape = [2, 3]}
    func.return %r
  }
}"#,
        );
        assert_snapshot!(printed, @r#"
        core.module @test {
          func.func @lt(%0: core.tensor(core.i32) {shape = [2, 3]}, %1: core.tensor(core.i32) {shape = [2, 3]}) -> core.tensor(core.i1) {shape = [2, 3]} {
            %2 = xla_hlo.compare %0, %1 {comparison_direction = "LT"} : core.tensor(core.i1) {shape = [2, 3]}
            func.return %2
          }
        }
        "#);
    }

    #[test]
    fn test_roundtrip_empty_module() {
        let printed = assert_roundtrip("core.module @empty {\n}");
        assert_eq!(printed, "core.module @empty {\n}\n");

        let mut ctx = IrContext::new();
        let module = parse_core_module(&mut ctx, &printed).expect("empty module");
        assert!(module.ops(&ctx).is_empty());
    }

    #[test]
    fn test_roundtrip_multiple_functions() {
        let printed = assert_roundtrip(
            r#"core.module @m {
  // iota feeding an add
  func.func @f() -> core.tensor(core.i64) {shape = [4]} {
    %0 = xla_hlo.iota {iota_dimension = 0} : core.tensor(core.i64) {shape = [4]}
    %1 = xla_hlo.add %0, %0 : core.tensor(core.i64) {shape = [4]}
    func.return %1
  }
  func.func @g() {
    %0 = std.constant {value = [1, 18446744073709551615]} : core.tensor(core.i8) {shape = [2]}
    func.return
  }
}"#,
        );
        assert_snapshot!(printed, @r"
        core.module @m {
          func.func @f() -> core.tensor(core.i64) {shape = [4]} {
            %0 = xla_hlo.iota {iota_dimension = 0} : core.tensor(core.i64) {shape = [4]}
            %1 = xla_hlo.add %0, %0 : core.tensor(core.i64) {shape = [4]}
            func.return %1
          }
          func.func @g() {
            %0 = std.constant {value = [1, 18446744073709551615]} : core.tensor(core.i8) {shape = [2]}
            func.return
          }
        }
        ");
    }

    #[test]
    fn test_roundtrip_multi_block_function() {
        let printed = assert_roundtrip(
            r#"core.module @m {
  func.func @f(%x: core.i32) -> core.i32 {
    ^entry:
      test.br %x
    ^exit(%y: core.i32):
      func.return %y
  }
}"#,
        );
        assert_snapshot!(printed, @r"
        core.module @m {
          func.func @f(%0: core.i32) -> core.i32 {
            ^bb0:
              test.br %0
            ^bb1(%1: core.i32):
              func.return %1
          }
        }
        ");
    }

    #[test]
    fn test_parsed_ops_are_typed() {
        let mut ctx = IrContext::new();
        let module = parse_core_module(
            &mut ctx,
            r#"core.module @m {
  func.func @f(%0: core.tensor(core.f32) {shape = [3]}) -> core.tensor(core.i1) {shape = [3]} {
    %1 = std.cmpf %0, %0 {predicate = @une} : core.tensor(core.i1) {shape = [3]}
    func.return %1
  }
}"#,
        )
        .expect("should parse");

        assert_eq!(module.name(&ctx), Some(Symbol::new("m")));
        let f = func::Func::from_op(&ctx, module.ops(&ctx)[0]).expect("func.func");
        assert_eq!(f.sym_name(&ctx), "f");
        let entry = f.entry_block(&ctx).expect("entry block");
        let arg = ctx.block_arg(entry, 0);
        assert_eq!(
            shaped::element_category(&ctx, ctx.value_ty(arg)),
            ElementCategory::Float
        );
        assert_eq!(shaped::shape(&ctx, ctx.value_ty(arg)), Some(vec![3]));

        let body_ops = ctx.block(entry).ops.to_vec();
        let cmp = standard::Cmpf::from_op(&ctx, body_ops[0]).expect("std.cmpf");
        assert_eq!(cmp.predicate(&ctx), Ok(standard::CmpFPredicate::Une));
        assert_eq!(cmp.lhs(&ctx), arg);

        let sig = f.signature(&ctx).expect("signature");
        assert_eq!(func::signature_result(&ctx, sig), Some(cmp.result_ty(&ctx)));
    }

    #[test]
    fn test_locations_record_offsets() {
        let mut ctx = IrContext::new();
        let src = "core.module @m {\n  func.func @f() {\n    %0 = xla_hlo.iota {iota_dimension = 0} : core.tensor(core.i32) {shape = [2]}\n    func.return\n  }\n}";
        let op = parse_source(&mut ctx, "model.hlo", src).expect("should parse");
        let module = core::Module::from_op(&ctx, op).expect("module");
        let f = func::Func::from_op(&ctx, module.ops(&ctx)[0]).expect("func");
        let iota_op = ctx.block(f.entry_block(&ctx).unwrap()).ops[0];
        assert!(hlo::Iota::matches(&ctx, iota_op));

        let loc = ctx.op(iota_op).location;
        assert_eq!(loc.file, "model.hlo");
        assert_eq!(loc.span.start, src.find("%0 = xla_hlo.iota").unwrap());
    }

    // ================================================================
    // Errors
    // ================================================================

    #[test]
    fn test_undefined_value_is_error() {
        let mut ctx = IrContext::new();
        let src = "core.module @m {\n  func.func @f() {\n    func.return %missing\n  }\n}";
        let err = parse_module(&mut ctx, src).unwrap_err();
        assert!(err.message.contains("undefined value '%missing'"), "{err}");
        assert_eq!(err.offset, src.find("func.return").unwrap());
    }

    #[test]
    fn test_duplicate_ssa_name_is_error() {
        let mut ctx = IrContext::new();
        let err = parse_module(
            &mut ctx,
            r#"core.module @m {
  func.func @f(%a: core.i32) {
    %a = std.constant {value = 1} : core.i32
    func.return
  }
}"#,
        )
        .unwrap_err();
        assert!(err.message.contains("duplicate SSA name '%a'"), "{err}");
    }

    #[test]
    fn test_result_count_mismatch_is_error() {
        let mut ctx = IrContext::new();
        let err = parse_module(
            &mut ctx,
            "core.module @m {\n  %0, %1 = std.constant {value = 1} : core.i32\n}",
        )
        .unwrap_err();
        assert!(err.message.contains("2 result names but 1 result types"), "{err}");
    }

    #[test]
    fn test_trailing_input_is_error() {
        let mut ctx = IrContext::new();
        let src = "core.module @m {\n}\ngarbage";
        let err = parse_module(&mut ctx, src).unwrap_err();
        assert_eq!(err.message, "trailing input after top-level operation");
        assert_eq!(err.offset, src.find("garbage").unwrap());
    }

    #[test]
    fn test_syntax_error_reports_offset() {
        let mut ctx = IrContext::new();
        let err = parse_module(&mut ctx, "core.module @m {\n  %0 = \n}").unwrap_err();
        assert!(err.message.starts_with("syntax error"), "{err}");
    }

    #[test]
    fn test_non_module_root_rejected_by_parse_core_module() {
        let mut ctx = IrContext::new();
        let err = parse_core_module(&mut ctx, "std.constant {value = 1} : core.i32").unwrap_err();
        assert_eq!(err.message, "expected operation core.module, found std.constant");
    }
}
