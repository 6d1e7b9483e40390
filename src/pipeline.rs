//! Pass pipeline: parse, run named passes, verify, print.
//!
//! ```text
//! source text
//!     │  tensor_ir::parser
//!     ▼
//! core.module
//!     │  passes, in the order requested
//!     ▼
//! core.module (optionally checked: no xla_hlo op left)
//!     │  tensor_ir::printer
//!     ▼
//! output text
//! ```

use hlo_passes::legalize_to_std;
use tensor_ir::dialect::core::Module;
use tensor_ir::parser::parse_core_source;
use tensor_ir::printer::print_module;
use tensor_ir::rewrite::{ApplyResult, PatternApplicator};
use tensor_ir::IrContext;

use crate::errors::{LowerError, LowerResult};

/// Runs a pass over a module with the given iteration bound.
pub type PassFn = fn(&mut IrContext, Module, usize) -> ApplyResult;

/// A registered pass.
#[derive(Clone, Copy)]
pub struct PassInfo {
    pub name: &'static str,
    pub description: &'static str,
    run: PassFn,
}

impl PassInfo {
    pub fn run(&self, ctx: &mut IrContext, module: Module, max_iterations: usize) -> ApplyResult {
        (self.run)(ctx, module, max_iterations)
    }
}

/// Pass names to pass functions, in registration order.
pub struct PassRegistry {
    passes: Vec<PassInfo>,
}

impl Default for PassRegistry {
    fn default() -> Self {
        Self::with_builtin_passes()
    }
}

impl PassRegistry {
    /// A registry with no passes.
    pub fn empty() -> Self {
        Self { passes: Vec::new() }
    }

    pub fn with_builtin_passes() -> Self {
        let mut registry = Self::empty();
        registry.register(
            legalize_to_std::PASS_NAME,
            legalize_to_std::PASS_DESCRIPTION,
            |ctx, module, max_iterations| {
                let applicator = legalize_to_std::populate_patterns(
                    PatternApplicator::new().with_max_iterations(max_iterations),
                );
                legalize_to_std::lower_with(ctx, &applicator, module)
            },
        );
        registry
    }

    /// Register a pass. A later registration under the same name replaces
    /// the earlier one.
    pub fn register(&mut self, name: &'static str, description: &'static str, run: PassFn) {
        let info = PassInfo {
            name,
            description,
            run,
        };
        match self.passes.iter_mut().find(|p| p.name == name) {
            Some(existing) => *existing = info,
            None => self.passes.push(info),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PassInfo> {
        self.passes.iter().find(|p| p.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PassInfo> {
        self.passes.iter()
    }
}

/// What to run and how.
#[derive(Clone, Debug)]
pub struct PipelineOptions {
    /// Pass names, run in order.
    pub passes: Vec<String>,
    /// Iteration bound handed to each pass's applicator.
    pub max_iterations: usize,
    /// Fail if any `xla_hlo` op remains after the passes.
    pub verify_legal: bool,
    /// Name recorded in op locations.
    pub source_name: String,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            passes: vec![legalize_to_std::PASS_NAME.to_owned()],
            max_iterations: PatternApplicator::DEFAULT_MAX_ITERATIONS,
            verify_legal: false,
            source_name: "<input>".to_owned(),
        }
    }
}

/// Statistics of one pass run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassStatistics {
    pub pass: &'static str,
    pub result: ApplyResult,
}

#[derive(Clone, Debug)]
pub struct PipelineOutput {
    /// The printed module after all passes.
    pub text: String,
    pub statistics: Vec<PassStatistics>,
}

/// Run the pipeline with the built-in passes.
pub fn run(source: &str, options: &PipelineOptions) -> LowerResult<PipelineOutput> {
    run_with_registry(&PassRegistry::default(), source, options)
}

pub fn run_with_registry(
    registry: &PassRegistry,
    source: &str,
    options: &PipelineOptions,
) -> LowerResult<PipelineOutput> {
    let passes = options
        .passes
        .iter()
        .map(|name| {
            registry
                .get(name)
                .ok_or_else(|| LowerError::UnknownPass(name.clone()))
        })
        .collect::<LowerResult<Vec<_>>>()?;

    let mut ctx = IrContext::new();
    let module = parse_core_source(&mut ctx, &options.source_name, source)?;

    let mut statistics = Vec::with_capacity(passes.len());
    for pass in passes {
        let result = pass.run(&mut ctx, module, options.max_iterations);
        tracing::info!(
            pass = pass.name,
            iterations = result.iterations,
            changes = result.total_changes,
            fixpoint = result.reached_fixpoint,
            "pass finished"
        );
        statistics.push(PassStatistics {
            pass: pass.name,
            result,
        });
    }

    if options.verify_legal {
        verify_legal(&ctx, module)?;
    }

    Ok(PipelineOutput {
        text: print_module(&ctx, module.op_ref()),
        statistics,
    })
}

fn verify_legal(ctx: &IrContext, module: Module) -> LowerResult<()> {
    let illegal = legalize_to_std::conversion_target().verify(ctx, module.body(ctx));
    if illegal.is_empty() {
        return Ok(());
    }
    let ops = illegal
        .iter()
        .map(|op| {
            let offset = ctx.op(op.op).location.span.start;
            format!("{}.{} at offset {offset}", op.dialect, op.name)
        })
        .collect();
    Err(LowerError::IllegalOps { ops })
}
