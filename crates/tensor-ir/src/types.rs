//! Attribute values and the hash-consed type table.
//!
//! A type is `dialect.name(params...) {attrs}`; `core.tensor(core.i32)
//! {shape = [2, 3]}` is the common case. Types are interned so that type
//! equality is handle equality.

use std::collections::hash_map::{Entry, HashMap};
use std::collections::BTreeMap;

use cranelift_entity::PrimaryMap;
use smallvec::SmallVec;

use crate::refs::TypeRef;
use crate::symbol::Symbol;

/// Constant data carried by ops and types.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Attribute {
    Unit,
    Bool(bool),
    /// Signless integer bits. Negative literals are stored two's-complement.
    IntBits(u64),
    /// `f64::to_bits` of the value, so attributes stay `Eq + Hash`.
    FloatBits(u64),
    String(String),
    Type(TypeRef),
    Symbol(Symbol),
    List(Vec<Attribute>),
}

impl Attribute {
    pub fn as_int_bits(&self) -> Option<u64> {
        match *self {
            Attribute::IntBits(bits) => Some(bits),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Attribute::String(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<Symbol> {
        match *self {
            Attribute::Symbol(sym) => Some(sym),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<TypeRef> {
        match *self {
            Attribute::Type(ty) => Some(ty),
            _ => None,
        }
    }
}

/// Structural description of a type, the key of the [`TypeTable`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeData {
    pub dialect: Symbol,
    pub name: Symbol,
    pub params: SmallVec<[TypeRef; 2]>,
    pub attrs: BTreeMap<Symbol, Attribute>,
}

impl TypeData {
    pub fn new(dialect: Symbol, name: Symbol) -> Self {
        Self {
            dialect,
            name,
            params: SmallVec::new(),
            attrs: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, ty: TypeRef) -> Self {
        self.params.push(ty);
        self
    }

    pub fn with_attr(mut self, key: Symbol, value: Attribute) -> Self {
        self.attrs.insert(key, value);
        self
    }

    /// `dialect.name` test, ignoring params and attrs.
    pub fn is(&self, dialect: Symbol, name: Symbol) -> bool {
        self.dialect == dialect && self.name == name
    }
}

/// Interned types of one context.
#[derive(Default)]
pub struct TypeTable {
    entries: PrimaryMap<TypeRef, TypeData>,
    index: HashMap<TypeData, TypeRef>,
}

impl TypeTable {
    pub fn intern(&mut self, data: TypeData) -> TypeRef {
        match self.index.entry(data) {
            Entry::Occupied(slot) => *slot.get(),
            Entry::Vacant(slot) => {
                let ty = self.entries.push(slot.key().clone());
                *slot.insert(ty)
            }
        }
    }

    pub fn get(&self, ty: TypeRef) -> &TypeData {
        &self.entries[ty]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
