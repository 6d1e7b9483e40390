//! Source positions attached to operations.

use crate::symbol::Symbol;

/// Byte range in the source text.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Empty span at `offset`.
    pub const fn at(offset: usize) -> Self {
        Self::new(offset, offset)
    }
}

/// File name plus span. Ops built by rewrites inherit the location of the op
/// they replace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    pub file: Symbol,
    pub span: Span,
}

impl Location {
    pub const fn new(file: Symbol, span: Span) -> Self {
        Self { file, span }
    }

    /// Location for IR that has no source text.
    pub fn synthetic() -> Self {
        Self::new(Symbol::new("<synthetic>"), Span::default())
    }
}
