//! asmcorpus-repair — standalone JSON-array repair utility.
//!
//! Applies the pipeline's output repair pass to any JSON-array-shaped file:
//! strips dangling separators, closes the array, validates the result, and
//! only then replaces the target. In-place when no output path is given.
//!
//! Exit codes:
//! - 0: repaired (or already valid) and validated
//! - 1: missing input or other I/O failure
//! - 2: repair could not produce valid JSON; the attempted scratch output
//!   is left on disk for inspection

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

use asmcorpus_core::{init_tracing, repair_file, CorpusError, RepairOutcome};

#[derive(Parser)]
#[command(name = "asmcorpus-repair")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Repair and validate a JSON array document", long_about = None)]
struct Cli {
    /// JSON array file to repair
    input: PathBuf,

    /// Destination for the repaired document (defaults to INPUT, in-place)
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(1);
        }
    };
    init_tracing(false, Level::WARN);

    let output = cli.output.clone().unwrap_or_else(|| cli.input.clone());

    match repair_file(&cli.input, &output) {
        Ok(RepairOutcome::AlreadyValid) => {
            println!("{}: already valid", output.display());
            ExitCode::SUCCESS
        }
        Ok(RepairOutcome::Repaired { actions }) => {
            println!("{}: repaired and validated ({actions:?})", output.display());
            ExitCode::SUCCESS
        }
        Err(CorpusError::Unrepairable { scratch }) => {
            eprintln!(
                "asmcorpus-repair: could not produce valid JSON; attempt left at {}",
                scratch.display()
            );
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("asmcorpus-repair: {e}");
            ExitCode::from(1)
        }
    }
}
