//! Dialect legalization passes over `tensor-ir`.
//!
//! Each pass is a set of [`RewritePattern`]s driven to a fixed point by a
//! [`PatternApplicator`].

pub mod legalize_to_std;

pub use legalize_to_std::{lower, populate_patterns, run_on_function};
pub use tensor_ir::rewrite::{ApplyResult, PatternApplicator, RewritePattern};
