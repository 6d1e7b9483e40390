//! `hlo-opt` entry point.

mod cli;

use std::io::{Read, Write};
use std::process::ExitCode;

use clap::Parser;
use cli::Cli;
use hlo_lower::errors::{LowerError, LowerResult};
use hlo_lower::pipeline::{self, PassRegistry};

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.init_logging();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> LowerResult<()> {
    let registry = PassRegistry::default();
    if cli.list_passes {
        for pass in registry.iter() {
            println!("{:<24} {}", pass.name, pass.description);
        }
        return Ok(());
    }

    let source = match cli.input_path() {
        Some(path) => std::fs::read_to_string(path).map_err(|e| LowerError::io(path, e))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| LowerError::io("<stdin>", e))?;
            buf
        }
    };

    let output = pipeline::run_with_registry(&registry, &source, &cli.pipeline_options())?;

    match &cli.output {
        Some(path) => std::fs::write(path, &output.text).map_err(|e| LowerError::io(path, e))?,
        None => std::io::stdout()
            .write_all(output.text.as_bytes())
            .map_err(|e| LowerError::io("<stdout>", e))?,
    }
    Ok(())
}
