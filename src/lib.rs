//! Lowering driver for `xla_hlo` tensor IR.
//!
//! Parses textual IR, runs a list of named passes over it and prints the
//! result. The `hlo-opt` binary is a thin CLI over [`pipeline::run`].

pub mod errors;
pub mod pipeline;

pub use errors::LowerError;
pub use pipeline::{PassRegistry, PipelineOptions, PipelineOutput, run};
