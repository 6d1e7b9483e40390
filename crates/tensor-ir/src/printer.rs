//! Text form of the IR.
//!
//! ```text
//! core.module @m {
//!   func.func @f(%0: core.tensor(core.i32) {shape = [4]}) -> core.tensor(core.i1) {shape = [4]} {
//!     %1 = std.cmpi %0, %0 {predicate = @slt} : core.tensor(core.i1) {shape = [4]}
//!     func.return %1
//!   }
//! }
//! ```
//!
//! `core.module` and `func.func` have the custom forms shown above; every
//! other op uses the generic form. Values are numbered from `%0` in each
//! top-level op. A region's label is dropped when it has a single block
//! without arguments.

use std::collections::HashMap;
use std::fmt::{self, Write};

use crate::context::IrContext;
use crate::dialect::{core, func};
use crate::ops::DialectOp;
use crate::refs::{BlockRef, OpRef, RegionRef, TypeRef, ValueRef};
use crate::symbol::Symbol;
use crate::types::Attribute;

/// Print `root` and everything nested in it.
pub fn print_module(ctx: &IrContext, root: OpRef) -> String {
    Listing { ctx, root }.to_string()
}

struct Listing<'a> {
    ctx: &'a IrContext,
    root: OpRef,
}

impl fmt::Display for Listing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        OpPrinter::new(self.ctx, f).op(self.root, 0)
    }
}

// Types and attributes

fn write_type(ctx: &IrContext, out: &mut impl Write, ty: TypeRef) -> fmt::Result {
    let data = ctx.types.get(ty);
    write!(out, "{}.{}", data.dialect, data.name)?;
    // An attribute dict is only read back after a parameter list.
    if !data.params.is_empty() || !data.attrs.is_empty() {
        out.write_char('(')?;
        for (i, &param) in data.params.iter().enumerate() {
            out.write_str(if i == 0 { "" } else { ", " })?;
            write_type(ctx, out, param)?;
        }
        out.write_char(')')?;
    }
    write_attr_dict(ctx, out, &data.attrs)
}

fn write_attr_dict<'a>(
    ctx: &IrContext,
    out: &mut impl Write,
    entries: impl IntoIterator<Item = (&'a Symbol, &'a Attribute)>,
) -> fmt::Result {
    let mut open = false;
    for (key, value) in entries {
        out.write_str(if open { ", " } else { " {" })?;
        open = true;
        write!(out, "{key} = ")?;
        write_attribute(ctx, out, value)?;
    }
    if open {
        out.write_char('}')?;
    }
    Ok(())
}

fn write_attribute(ctx: &IrContext, out: &mut impl Write, attr: &Attribute) -> fmt::Result {
    match attr {
        Attribute::Unit => out.write_str("unit"),
        Attribute::Bool(b) => write!(out, "{b}"),
        Attribute::IntBits(bits) => write!(out, "{bits}"),
        Attribute::FloatBits(bits) => {
            let text = f64::from_bits(*bits).to_string();
            out.write_str(&text)?;
            // Keep the dot so the value reads back as a float.
            if text.bytes().all(|b| b.is_ascii_digit() || b == b'-') {
                out.write_str(".0")?;
            }
            Ok(())
        }
        Attribute::String(text) => write_quoted(out, text),
        Attribute::Symbol(sym) => write_symbol(out, *sym),
        Attribute::Type(ty) => write_type(ctx, out, *ty),
        Attribute::List(items) => {
            out.write_char('[')?;
            for (i, item) in items.iter().enumerate() {
                out.write_str(if i == 0 { "" } else { ", " })?;
                write_attribute(ctx, out, item)?;
            }
            out.write_char(']')
        }
    }
}

fn write_quoted(out: &mut impl Write, text: &str) -> fmt::Result {
    out.write_char('"')?;
    for c in text.chars() {
        match c {
            '"' | '\\' => write!(out, "\\{c}")?,
            '\n' => out.write_str("\\n")?,
            '\t' => out.write_str("\\t")?,
            '\r' => out.write_str("\\r")?,
            '\0' => out.write_str("\\0")?,
            c if c.is_control() => write!(out, "\\x{:02x}", u32::from(c))?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('"')
}

fn write_symbol(out: &mut impl Write, sym: Symbol) -> fmt::Result {
    sym.with_str(|name| {
        out.write_char('@')?;
        let bare = !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_');
        if bare { out.write_str(name) } else { write_quoted(out, name) }
    })
}

// Ops

struct OpPrinter<'a, W> {
    ctx: &'a IrContext,
    out: W,
    names: HashMap<ValueRef, usize>,
    next_label: usize,
}

impl<'a, W: Write> OpPrinter<'a, W> {
    fn new(ctx: &'a IrContext, out: W) -> Self {
        Self {
            ctx,
            out,
            names: HashMap::new(),
            next_label: 0,
        }
    }

    /// Start a fresh numbering scope.
    fn restart(&mut self) {
        self.names.clear();
        self.next_label = 0;
    }

    fn define(&mut self, value: ValueRef) -> fmt::Result {
        let number = self.names.len();
        self.names.insert(value, number);
        write!(self.out, "%{number}")
    }

    fn value(&mut self, value: ValueRef) -> fmt::Result {
        match self.names.get(&value) {
            Some(number) => write!(self.out, "%{number}"),
            None => self.out.write_str("%?"),
        }
    }

    /// `(%n: type, ...)`, defining each argument.
    fn typed_args(&mut self, args: &[ValueRef]) -> fmt::Result {
        self.out.write_char('(')?;
        for (i, &arg) in args.iter().enumerate() {
            self.out.write_str(if i == 0 { "" } else { ", " })?;
            self.define(arg)?;
            self.out.write_str(": ")?;
            write_type(self.ctx, &mut self.out, self.ctx.value_ty(arg))?;
        }
        self.out.write_char(')')
    }

    /// Reserve consecutive labels for `blocks`, returning the first.
    fn reserve_labels(&mut self, blocks: &[BlockRef]) -> usize {
        let first = self.next_label;
        self.next_label += blocks.len();
        first
    }

    fn op(&mut self, op: OpRef, indent: usize) -> fmt::Result {
        if let Ok(module) = core::Module::from_op(self.ctx, op) {
            self.module(module, indent)
        } else if let Ok(function) = func::Func::from_op(self.ctx, op) {
            self.func(function, indent)
        } else {
            self.generic(op, indent)
        }
    }

    fn generic(&mut self, op: OpRef, indent: usize) -> fmt::Result {
        let ctx = self.ctx;
        write!(self.out, "{:indent$}", "")?;
        let results = ctx.op_results(op);
        for (i, &result) in results.iter().enumerate() {
            self.out.write_str(if i == 0 { "" } else { ", " })?;
            self.define(result)?;
        }
        if !results.is_empty() {
            self.out.write_str(" = ")?;
        }

        let data = ctx.op(op);
        write!(self.out, "{}.{}", data.dialect, data.name)?;
        for (i, &operand) in ctx.op_operands(op).iter().enumerate() {
            self.out.write_str(if i == 0 { " " } else { ", " })?;
            self.value(operand)?;
        }
        write_attr_dict(ctx, &mut self.out, &data.attrs)?;
        for (i, &ty) in ctx.op_result_types(op).iter().enumerate() {
            self.out.write_str(if i == 0 { " : " } else { ", " })?;
            write_type(ctx, &mut self.out, ty)?;
        }
        for &region in &data.regions {
            self.out.write_str(" {\n")?;
            self.region(region, indent + 2)?;
            write!(self.out, "{:indent$}}}", "")?;
        }
        self.out.write_char('\n')
    }

    fn region(&mut self, region: RegionRef, indent: usize) -> fmt::Result {
        let ctx = self.ctx;
        let blocks = &ctx.region(region).blocks;
        let first = self.reserve_labels(blocks);
        let labelled = blocks.len() > 1 || blocks.iter().any(|&b| !ctx.block_args(b).is_empty());
        let body_indent = if labelled { indent + 2 } else { indent };
        for (i, &block) in blocks.iter().enumerate() {
            if labelled {
                write!(self.out, "{:indent$}^bb{}", "", first + i)?;
                let args = ctx.block_args(block);
                if !args.is_empty() {
                    self.typed_args(args)?;
                }
                self.out.write_str(":\n")?;
            }
            for &op in &ctx.block(block).ops {
                self.op(op, body_indent)?;
            }
        }
        Ok(())
    }

    fn module(&mut self, module: core::Module, indent: usize) -> fmt::Result {
        let ctx = self.ctx;
        write!(self.out, "{:indent$}core.module", "")?;
        if let Some(name) = module.name(ctx) {
            self.out.write_char(' ')?;
            write_symbol(&mut self.out, name)?;
        }
        let sym_name = core::ATTR_SYM_NAME();
        let rest = ctx.op(module.op_ref()).attrs.iter().filter(|(key, _)| **key != sym_name);
        write_attr_dict(ctx, &mut self.out, rest)?;
        self.out.write_str(" {\n")?;
        for op in module.ops(ctx) {
            self.restart();
            self.op(op, indent + 2)?;
        }
        self.restart();
        writeln!(self.out, "{:indent$}}}", "")
    }

    /// `func.func @name(args) -> result { ... }`. The entry block's
    /// arguments are the parameter list, so only later blocks print theirs.
    fn func(&mut self, function: func::Func, indent: usize) -> fmt::Result {
        let ctx = self.ctx;
        self.restart();
        write!(self.out, "{:indent$}func.func ", "")?;
        write_symbol(&mut self.out, function.sym_name(ctx))?;

        let blocks = &ctx.region(function.body(ctx)).blocks;
        let entry_args = blocks.first().map_or(&[][..], |&entry| ctx.block_args(entry));
        self.typed_args(entry_args)?;
        let result = function
            .signature(ctx)
            .and_then(|signature| func::signature_result(ctx, signature));
        if let Some(result) = result {
            self.out.write_str(" -> ")?;
            write_type(ctx, &mut self.out, result)?;
        }
        self.out.write_str(" {\n")?;

        let first = self.reserve_labels(blocks);
        let labelled = blocks.len() > 1;
        let body_indent = indent + if labelled { 4 } else { 2 };
        for (i, &block) in blocks.iter().enumerate() {
            if labelled {
                write!(self.out, "{:indent$}  ^bb{}", "", first + i)?;
                let args = ctx.block_args(block);
                if i > 0 && !args.is_empty() {
                    self.typed_args(args)?;
                }
                self.out.write_str(":\n")?;
            }
            for &op in &ctx.block(block).ops {
                self.op(op, body_indent)?;
            }
        }
        writeln!(self.out, "{:indent$}}}", "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{hlo, standard};
    use crate::location::Location;
    use crate::shaped::{float_type, int_type, tensor_type};
    use insta::assert_snapshot;

    fn type_text(ctx: &IrContext, ty: TypeRef) -> String {
        let mut text = String::new();
        write_type(ctx, &mut text, ty).unwrap();
        text
    }

    fn attr_text(attr: &Attribute) -> String {
        let mut text = String::new();
        write_attribute(&IrContext::new(), &mut text, attr).unwrap();
        text
    }

    #[test]
    fn test_print_scalar_and_tensor_types() {
        let mut ctx = IrContext::new();
        let i32_ty = int_type(&mut ctx, 32);
        let t = tensor_type(&mut ctx, i32_ty, &[2, 3]);
        assert_eq!(type_text(&ctx, i32_ty), "core.i32");
        assert_eq!(type_text(&ctx, t), "core.tensor(core.i32) {shape = [2, 3]}");
    }

    #[test]
    fn test_print_detached_op() {
        let mut ctx = IrContext::new();
        let i32_ty = int_type(&mut ctx, 32);
        let t = tensor_type(&mut ctx, i32_ty, &[4]);
        let iota = hlo::iota(&mut ctx, Location::synthetic(), t, 0);
        assert_snapshot!(print_module(&ctx, iota.op_ref()), @"%0 = xla_hlo.iota {iota_dimension = 0} : core.tensor(core.i32) {shape = [4]}");
    }

    #[test]
    fn test_print_function_in_module() {
        let mut ctx = IrContext::new();
        let loc = Location::synthetic();
        let f32_ty = float_type(&mut ctx, "f32");
        let i1 = int_type(&mut ctx, 1);
        let t = tensor_type(&mut ctx, f32_ty, &[2]);
        let pred_t = tensor_type(&mut ctx, i1, &[2]);

        let entry = ctx.create_block(&[t, t]);
        let a = ctx.block_arg(entry, 0);
        let b = ctx.block_arg(entry, 1);
        let cmp = standard::cmpf(&mut ctx, loc, standard::CmpFPredicate::Une, a, b, pred_t);
        ctx.push_op(entry, cmp.op_ref());
        let ne = cmp.result(&ctx);
        let ret = func::r#return(&mut ctx, loc, [ne]);
        ctx.push_op(entry, ret.op_ref());
        let body = ctx.create_region([entry]);
        let sig = func::function_type(&mut ctx, &[t, t], Some(pred_t));
        let f = func::func(&mut ctx, loc, Symbol::new("ne"), sig, body);

        let module_block = ctx.create_block(&[]);
        ctx.push_op(module_block, f.op_ref());
        let module_region = ctx.create_region([module_block]);
        let module = core::module(&mut ctx, loc, Symbol::new("m"), module_region);

        assert_snapshot!(print_module(&ctx, module.op_ref()), @r"
        core.module @m {
          func.func @ne(%0: core.tensor(core.f32) {shape = [2]}, %1: core.tensor(core.f32) {shape = [2]}) -> core.tensor(core.i1) {shape = [2]} {
            %2 = std.cmpf %0, %1 {predicate = @une} : core.tensor(core.i1) {shape = [2]}
            func.return %2
          }
        }
        ");
    }

    #[test]
    fn test_print_function_without_result() {
        let mut ctx = IrContext::new();
        let loc = Location::synthetic();
        let entry = ctx.create_block(&[]);
        let ret = func::r#return(&mut ctx, loc, []);
        ctx.push_op(entry, ret.op_ref());
        let body = ctx.create_region([entry]);
        let sig = func::function_type(&mut ctx, &[], None);
        let f = func::func(&mut ctx, loc, Symbol::new("empty"), sig, body);

        assert_snapshot!(print_module(&ctx, f.op_ref()), @r"
        func.func @empty() {
          func.return
        }
        ");
    }

    #[test]
    fn test_print_labelled_region() {
        let mut ctx = IrContext::new();
        let i32_ty = int_type(&mut ctx, 32);
        let block = ctx.create_block(&[i32_ty]);
        let arg = ctx.block_arg(block, 0);
        let ret = func::r#return(&mut ctx, Location::synthetic(), [arg]);
        ctx.push_op(block, ret.op_ref());
        let region = ctx.create_region([block]);
        let outer = crate::context::OpBuilder::new(
            Location::synthetic(),
            Symbol::new("test"),
            Symbol::new("outer"),
        )
        .region(region)
        .build(&mut ctx);

        assert_snapshot!(print_module(&ctx, outer), @r"
        test.outer {
          ^bb0(%0: core.i32):
            func.return %0
        }
        ");
    }

    #[test]
    fn test_print_attribute_kinds() {
        assert_eq!(attr_text(&Attribute::Bool(true)), "true");
        assert_eq!(attr_text(&Attribute::Unit), "unit");
        assert_eq!(attr_text(&Attribute::FloatBits(42.0f64.to_bits())), "42.0");
        assert_eq!(attr_text(&Attribute::FloatBits((-0.5f64).to_bits())), "-0.5");
        assert_eq!(attr_text(&Attribute::FloatBits(f64::INFINITY.to_bits())), "inf");
        assert_eq!(
            attr_text(&Attribute::String("a\"b\n".to_owned())),
            r#""a\"b\n""#
        );
        assert_eq!(
            attr_text(&Attribute::Symbol(Symbol::from_dynamic("x.y"))),
            r#"@"x.y""#
        );
        assert_eq!(
            attr_text(&Attribute::List(vec![Attribute::IntBits(1), Attribute::IntBits(2)])),
            "[1, 2]"
        );
    }
}
