//! Shaped-type queries and dense integer element storage.
//!
//! Tensor types are spelled `core.tensor(<element>) {shape = [d0, d1, ...]}`.
//! Element types are the scalar `core.i<N>` integers (1 <= N <= 64) and the
//! `core.f16`, `core.bf16`, `core.f32`, `core.f64` floats. Anything else is
//! classified as [`ElementCategory::Other`].

use crate::context::IrContext;
use crate::refs::TypeRef;
use crate::symbol::Symbol;
use crate::types::{Attribute, TypeData};

crate::symbols! {
    CORE => "core",
    TENSOR => "tensor",
    ATTR_SHAPE => "shape",
}

/// Element-type category of a (possibly shaped) type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementCategory {
    /// Signless integer with the given bit width.
    Integer(u32),
    Float,
    Other,
}

impl ElementCategory {
    pub fn is_integer(self) -> bool {
        matches!(self, ElementCategory::Integer(_))
    }

    pub fn is_float(self) -> bool {
        matches!(self, ElementCategory::Float)
    }
}

// ============================================================================
// Queries
// ============================================================================

/// Check whether `ty` is a `core.tensor` type.
pub fn is_tensor(ctx: &IrContext, ty: TypeRef) -> bool {
    ctx.types.get(ty).is(CORE(), TENSOR())
}

/// Element type of a tensor, or the type itself for scalars.
pub fn element_type(ctx: &IrContext, ty: TypeRef) -> TypeRef {
    let data = ctx.types.get(ty);
    if is_tensor(ctx, ty)
        && let Some(&elem) = data.params.first()
    {
        return elem;
    }
    ty
}

/// Category of the element type of `ty`.
pub fn element_category(ctx: &IrContext, ty: TypeRef) -> ElementCategory {
    let elem = element_type(ctx, ty);
    let data = ctx.types.get(elem);
    if data.dialect != CORE() || !data.params.is_empty() {
        return ElementCategory::Other;
    }
    data.name.with_str(|name| match name {
        "f16" | "bf16" | "f32" | "f64" => ElementCategory::Float,
        _ => match parse_int_width(name) {
            Some(width) => ElementCategory::Integer(width),
            None => ElementCategory::Other,
        },
    })
}

/// Bit width of the integer element type of `ty`, if it has one.
pub fn integer_width(ctx: &IrContext, ty: TypeRef) -> Option<u32> {
    match element_category(ctx, ty) {
        ElementCategory::Integer(width) => Some(width),
        _ => None,
    }
}

/// Ordered extents of a tensor type. `None` for non-tensor types or a
/// malformed `shape` attribute.
pub fn shape(ctx: &IrContext, ty: TypeRef) -> Option<Vec<u64>> {
    if !is_tensor(ctx, ty) {
        return None;
    }
    match ctx.types.get(ty).attrs.get(&ATTR_SHAPE())? {
        Attribute::List(dims) => dims.iter().map(Attribute::as_int_bits).collect(),
        _ => None,
    }
}

fn parse_int_width(name: &str) -> Option<u32> {
    let width: u32 = name.strip_prefix('i')?.parse().ok()?;
    (1..=64).contains(&width).then_some(width)
}

// ============================================================================
// Constructors
// ============================================================================

/// Intern `core.i<width>`.
pub fn int_type(ctx: &mut IrContext, width: u32) -> TypeRef {
    let name = Symbol::from_dynamic(&format!("i{width}"));
    ctx.types.intern(TypeData::new(CORE(), name))
}

/// Intern a float element type by name (`f16`, `bf16`, `f32`, `f64`).
pub fn float_type(ctx: &mut IrContext, name: &'static str) -> TypeRef {
    ctx.types.intern(TypeData::new(CORE(), Symbol::new(name)))
}

/// Intern `core.tensor(<element>) {shape = [...]}`.
pub fn tensor_type(ctx: &mut IrContext, element: TypeRef, shape: &[u64]) -> TypeRef {
    let dims = shape.iter().map(|&d| Attribute::IntBits(d)).collect();
    ctx.types.intern(
        TypeData::new(CORE(), TENSOR())
            .with_param(element)
            .with_attr(ATTR_SHAPE(), Attribute::List(dims)),
    )
}

// ============================================================================
// DenseIntElements
// ============================================================================

/// Dense integer elements in row-major order.
///
/// Each element is the two's-complement bit pattern of a `bitwidth`-bit
/// integer, stored zero-extended in a `u64`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DenseIntElements {
    bitwidth: u32,
    bits: Vec<u64>,
}

impl DenseIntElements {
    pub fn with_capacity(bitwidth: u32, capacity: usize) -> Self {
        debug_assert!((1..=64).contains(&bitwidth));
        Self {
            bitwidth,
            bits: Vec::with_capacity(capacity),
        }
    }

    /// Append a value, truncating it to the element width.
    pub fn push(&mut self, value: u64) {
        self.bits.push(value & width_mask(self.bitwidth));
    }

    pub fn bitwidth(&self) -> u32 {
        self.bitwidth
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Raw (zero-extended) element bits.
    pub fn bits(&self) -> &[u64] {
        &self.bits
    }

    /// Element `index` read back as a sign-extended integer.
    pub fn signed(&self, index: usize) -> Option<i64> {
        self.bits
            .get(index)
            .map(|&bits| sign_extend(bits, self.bitwidth))
    }

    pub fn iter_signed(&self) -> impl Iterator<Item = i64> + '_ {
        self.bits
            .iter()
            .map(move |&bits| sign_extend(bits, self.bitwidth))
    }

    /// The `value` attribute of a `std.constant`.
    pub fn to_attribute(&self) -> Attribute {
        Attribute::List(self.bits.iter().map(|&b| Attribute::IntBits(b)).collect())
    }

    /// Read a `value` attribute back. Fails if it is not a list of integers.
    pub fn from_attribute(attr: &Attribute, bitwidth: u32) -> Option<Self> {
        let Attribute::List(items) = attr else {
            return None;
        };
        let mut dense = Self::with_capacity(bitwidth, items.len());
        for item in items {
            dense.push(item.as_int_bits()?);
        }
        Some(dense)
    }
}

fn width_mask(bitwidth: u32) -> u64 {
    if bitwidth >= 64 {
        u64::MAX
    } else {
        (1u64 << bitwidth) - 1
    }
}

fn sign_extend(bits: u64, bitwidth: u32) -> i64 {
    let shift = 64 - bitwidth.min(64);
    ((bits << shift) as i64) >> shift
}
