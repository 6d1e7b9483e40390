//! Tensor IR crate.
//!
//! An arena-allocated, mutable SSA IR with use-chains and RAUW, a small set of
//! dialects (`core`, `func`, `xla_hlo`, `std`), a text format, and the greedy
//! pattern-rewrite engine that legalization passes are built on.

// === IR infrastructure ===
pub mod context;
pub mod location;
pub mod ops;
pub mod refs;
pub mod shaped;
pub mod symbol;
pub mod types;
pub mod walk;

// === Dialect modules ===
pub mod dialect;

// === Text format ===
pub mod parser;
pub mod printer;

// === Rewriting ===
pub mod rewrite;

pub use context::{BlockData, IrContext, OpBuilder, OpData, RegionData, Use};
pub use dialect::core::Module;
pub use location::{Location, Span};
pub use ops::{ConversionError, DialectOp};
pub use parser::{ParseError, parse_core_module, parse_module};
pub use refs::{BlockRef, OpRef, RegionRef, TypeRef, ValueDef, ValueRef};
pub use symbol::Symbol;
pub use types::{Attribute, TypeData, TypeTable};
