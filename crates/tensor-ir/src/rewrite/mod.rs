//! Greedy pattern rewriting.
//!
//! A [`RewritePattern`] matches one op and builds its replacement; the
//! [`PatternApplicator`] splices replacements in and sweeps until nothing
//! changes. A [`ConversionTarget`] checks what is left afterwards.

pub mod applicator;
pub mod conversion_target;
pub mod pattern;
pub mod rewriter;

pub use applicator::{ApplyResult, PatternApplicator};
pub use conversion_target::{ConversionTarget, IllegalOp, Legality};
pub use pattern::RewritePattern;
pub use rewriter::PatternRewriter;
