//! Command-line interface for `hlo-opt`.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use hlo_lower::PipelineOptions;
use hlo_passes::legalize_to_std;
use tensor_ir::rewrite::PatternApplicator;

#[derive(Parser, Debug)]
#[command(name = "hlo-opt")]
#[command(about = "Lower xla_hlo tensor IR to the std dialect", long_about = None)]
pub struct Cli {
    /// Input IR file; `-` or nothing reads stdin
    pub input: Option<PathBuf>,

    /// Pass to run, repeatable; defaults to xla-legalize-to-std
    #[arg(short = 'p', long = "pass", value_name = "NAME")]
    pub passes: Vec<String>,

    /// Upper bound on rewrite iterations per function
    #[arg(long, value_name = "N", default_value_t = PatternApplicator::DEFAULT_MAX_ITERATIONS)]
    pub max_iterations: usize,

    /// Fail if any xla_hlo operation remains
    #[arg(long)]
    pub verify_legal: bool,

    /// Print the available passes and exit
    #[arg(long)]
    pub list_passes: bool,

    /// Write the result here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Install a stderr subscriber. `RUST_LOG` overrides `-v`.
    pub fn init_logging(&self) {
        use tracing_subscriber::{EnvFilter, fmt};

        let level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    /// The input path, or `None` for stdin.
    pub fn input_path(&self) -> Option<&PathBuf> {
        self.input.as_ref().filter(|p| p.as_os_str() != "-")
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        let passes = if self.passes.is_empty() {
            vec![legalize_to_std::PASS_NAME.to_owned()]
        } else {
            self.passes.clone()
        };
        let source_name = match self.input_path() {
            Some(path) => path.display().to_string(),
            None => "<stdin>".to_owned(),
        };
        PipelineOptions {
            passes,
            max_iterations: self.max_iterations,
            verify_legal: self.verify_legal,
            source_name,
        }
    }
}
