//! The IR store.
//!
//! Ops, values, blocks and regions live in arenas owned by [`IrContext`] and
//! are addressed by the handles in [`crate::refs`]. Ownership is a tree:
//! a region belongs to one op, a block to one region, an op to at most one
//! block. Every value records the operand slots that read it, so
//! [`IrContext::replace_all_uses`] never scans the IR.

use std::collections::BTreeMap;

use cranelift_entity::PrimaryMap;
use smallvec::SmallVec;

use crate::location::Location;
use crate::refs::{BlockRef, OpRef, RegionRef, TypeRef, ValueDef, ValueRef};
use crate::symbol::Symbol;
use crate::types::{Attribute, TypeTable};

/// Operand slot `slot` of `user` reads the value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Use {
    pub user: OpRef,
    pub slot: u32,
}

pub struct OpData {
    pub location: Location,
    pub dialect: Symbol,
    pub name: Symbol,
    pub attrs: BTreeMap<Symbol, Attribute>,
    pub regions: SmallVec<[RegionRef; 1]>,
    /// `None` while the op is detached.
    pub parent: Option<BlockRef>,
    operands: SmallVec<[ValueRef; 2]>,
    results: SmallVec<[ValueRef; 1]>,
    result_types: SmallVec<[TypeRef; 1]>,
}

struct ValueData {
    def: ValueDef,
    ty: TypeRef,
    uses: SmallVec<[Use; 2]>,
}

pub struct BlockData {
    pub ops: Vec<OpRef>,
    pub parent: Option<RegionRef>,
    args: SmallVec<[ValueRef; 2]>,
}

pub struct RegionData {
    pub blocks: SmallVec<[BlockRef; 1]>,
    pub parent: Option<OpRef>,
}

#[derive(Default)]
pub struct IrContext {
    pub types: TypeTable,
    ops: PrimaryMap<OpRef, OpData>,
    values: PrimaryMap<ValueRef, ValueData>,
    blocks: PrimaryMap<BlockRef, BlockData>,
    regions: PrimaryMap<RegionRef, RegionData>,
}

impl IrContext {
    pub fn new() -> Self {
        Self::default()
    }

    // Ops

    fn insert_op(&mut self, parts: OpBuilder) -> OpRef {
        let op = self.ops.next_key();
        for &region in &parts.regions {
            let owner = self.regions[region].parent.replace(op);
            assert!(owner.is_none(), "{region} is already owned by {owner:?}");
        }
        for (slot, &value) in parts.operands.iter().enumerate() {
            self.values[value].uses.push(Use {
                user: op,
                slot: slot as u32,
            });
        }
        let results = parts
            .result_types
            .iter()
            .enumerate()
            .map(|(index, &ty)| self.new_value(ValueDef::OpResult(op, index as u32), ty))
            .collect();
        let pushed = self.ops.push(OpData {
            location: parts.location,
            dialect: parts.dialect,
            name: parts.name,
            attrs: parts.attrs,
            regions: parts.regions,
            parent: None,
            operands: parts.operands,
            results,
            result_types: parts.result_types,
        });
        debug_assert_eq!(pushed, op);
        op
    }

    pub fn op(&self, op: OpRef) -> &OpData {
        &self.ops[op]
    }

    pub fn op_operands(&self, op: OpRef) -> &[ValueRef] {
        &self.ops[op].operands
    }

    pub fn op_results(&self, op: OpRef) -> &[ValueRef] {
        &self.ops[op].results
    }

    pub fn op_result(&self, op: OpRef, index: usize) -> ValueRef {
        self.ops[op].results[index]
    }

    pub fn op_result_types(&self, op: OpRef) -> &[TypeRef] {
        &self.ops[op].result_types
    }

    pub fn op_attr(&self, op: OpRef, key: Symbol) -> Option<&Attribute> {
        self.ops[op].attrs.get(&key)
    }

    /// Attach a detached op at the end of `block`.
    pub fn push_op(&mut self, block: BlockRef, op: OpRef) {
        self.attach(op, block);
        self.blocks[block].ops.push(op);
    }

    /// Attach a detached op right before `anchor`, in `anchor`'s block.
    pub fn insert_before(&mut self, anchor: OpRef, op: OpRef) {
        let Some(block) = self.ops[anchor].parent else {
            panic!("insert_before: anchor {anchor} is detached");
        };
        self.attach(op, block);
        let ops = &mut self.blocks[block].ops;
        let Some(at) = ops.iter().position(|&o| o == anchor) else {
            panic!("insert_before: {anchor} is missing from {block}");
        };
        ops.insert(at, op);
    }

    fn attach(&mut self, op: OpRef, block: BlockRef) {
        let previous = self.ops[op].parent.replace(block);
        assert!(previous.is_none(), "{op} is already in {previous:?}");
    }

    /// Detach `op` and drop the uses it holds. Its results must be unused.
    /// The slot stays allocated but nothing refers to it afterwards.
    pub fn erase_op(&mut self, op: OpRef) {
        if let Some(block) = self.ops[op].parent.take() {
            self.blocks[block].ops.retain(|&o| o != op);
        }
        for &result in &self.ops[op].results {
            let uses = self.values[result].uses.len();
            assert_eq!(uses, 0, "erase_op: {result} of {op} still has {uses} use(s)");
        }
        let operands = std::mem::take(&mut self.ops[op].operands);
        for (slot, value) in operands.into_iter().enumerate() {
            self.values[value]
                .uses
                .retain(|u| !(u.user == op && u.slot as usize == slot));
        }
    }

    // Values

    fn new_value(&mut self, def: ValueDef, ty: TypeRef) -> ValueRef {
        self.values.push(ValueData {
            def,
            ty,
            uses: SmallVec::new(),
        })
    }

    pub fn value_ty(&self, value: ValueRef) -> TypeRef {
        self.values[value].ty
    }

    pub fn value_def(&self, value: ValueRef) -> ValueDef {
        self.values[value].def
    }

    pub fn uses(&self, value: ValueRef) -> &[Use] {
        &self.values[value].uses
    }

    pub fn has_uses(&self, value: ValueRef) -> bool {
        !self.values[value].uses.is_empty()
    }

    /// Point every operand that reads `from` at `to` instead.
    pub fn replace_all_uses(&mut self, from: ValueRef, to: ValueRef) {
        if from == to {
            return;
        }
        let moved = std::mem::take(&mut self.values[from].uses);
        for u in &moved {
            let operand = &mut self.ops[u.user].operands[u.slot as usize];
            debug_assert_eq!(*operand, from);
            *operand = to;
        }
        self.values[to].uses.extend(moved);
    }

    // Blocks and regions

    /// A new detached block with one argument per entry of `arg_types`.
    pub fn create_block(&mut self, arg_types: &[TypeRef]) -> BlockRef {
        let block = self.blocks.push(BlockData {
            ops: Vec::new(),
            parent: None,
            args: SmallVec::new(),
        });
        for (index, &ty) in arg_types.iter().enumerate() {
            let arg = self.new_value(ValueDef::BlockArg(block, index as u32), ty);
            self.blocks[block].args.push(arg);
        }
        block
    }

    pub fn block(&self, block: BlockRef) -> &BlockData {
        &self.blocks[block]
    }

    pub fn block_args(&self, block: BlockRef) -> &[ValueRef] {
        &self.blocks[block].args
    }

    pub fn block_arg(&self, block: BlockRef, index: usize) -> ValueRef {
        self.blocks[block].args[index]
    }

    /// A new detached region taking ownership of `blocks`, in order.
    pub fn create_region(&mut self, blocks: impl IntoIterator<Item = BlockRef>) -> RegionRef {
        let region = self.regions.push(RegionData {
            blocks: SmallVec::new(),
            parent: None,
        });
        for block in blocks {
            let owner = self.blocks[block].parent.replace(region);
            assert!(owner.is_none(), "{block} is already owned by {owner:?}");
            self.regions[region].blocks.push(block);
        }
        region
    }

    pub fn region(&self, region: RegionRef) -> &RegionData {
        &self.regions[region]
    }
}

/// Collects the parts of a new op; [`OpBuilder::build`] allocates it detached.
pub struct OpBuilder {
    location: Location,
    dialect: Symbol,
    name: Symbol,
    operands: SmallVec<[ValueRef; 2]>,
    result_types: SmallVec<[TypeRef; 1]>,
    attrs: BTreeMap<Symbol, Attribute>,
    regions: SmallVec<[RegionRef; 1]>,
}

impl OpBuilder {
    pub fn new(location: Location, dialect: Symbol, name: Symbol) -> Self {
        Self {
            location,
            dialect,
            name,
            operands: SmallVec::new(),
            result_types: SmallVec::new(),
            attrs: BTreeMap::new(),
            regions: SmallVec::new(),
        }
    }

    pub fn operands(mut self, values: impl IntoIterator<Item = ValueRef>) -> Self {
        self.operands.extend(values);
        self
    }

    pub fn result(mut self, ty: TypeRef) -> Self {
        self.result_types.push(ty);
        self
    }

    pub fn results(mut self, types: impl IntoIterator<Item = TypeRef>) -> Self {
        self.result_types.extend(types);
        self
    }

    pub fn attr(mut self, key: Symbol, value: Attribute) -> Self {
        self.attrs.insert(key, value);
        self
    }

    /// Take ownership of `region`, which must still be detached.
    pub fn region(mut self, region: RegionRef) -> Self {
        self.regions.push(region);
        self
    }

    pub fn build(self, ctx: &mut IrContext) -> OpRef {
        ctx.insert_op(self)
    }
}
