//! asmcorpus — build a C source / disassembly dataset.
//!
//! Fetches the configured repositories, compiles every discovered `.c`
//! translation unit, disassembles the object, and streams
//! `{"code", "assembly"}` records into a single JSON array.
//!
//! Exit codes:
//! - 0: run completed and the output document validated
//! - 1: precondition failure (bad arguments, missing tool, unwritable
//!   output) or interrupted run
//! - 2: output written but could not be validated by the final repair step

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn, Level};

use asmcorpus_core::{
    ensure_toolchain, heal_output, init_tracing, repair_file, CorpusError, Pipeline, RunConfig,
    RunSummary,
};

#[derive(Parser)]
#[command(name = "asmcorpus")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build a C source / disassembly dataset as one JSON array", long_about = None)]
struct Cli {
    /// Enable informational logging
    #[arg(short = 'i', long)]
    info: bool,

    /// Enable warning logging
    #[arg(short = 'w', long)]
    warn: bool,

    /// Output path for the dataset document
    #[arg(short = 'o', long, default_value = "output.json")]
    output: PathBuf,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Usage goes to the terminal; bad arguments are a precondition
            // failure, exit 1.
            let _ = e.print();
            return ExitCode::from(1);
        }
    };

    let level = if cli.info {
        Level::INFO
    } else if cli.warn {
        Level::WARN
    } else {
        Level::ERROR
    };
    init_tracing(cli.json, level);

    match run(&cli).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %format!("{e:#}"), "fatal");
            eprintln!("asmcorpus: {e:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    ensure_toolchain()
        .await
        .context("toolchain check failed; install git, gcc and objdump")?;

    let config = RunConfig {
        output: cli.output.clone(),
        ..RunConfig::default()
    };
    let pipeline = Pipeline::with_real_tools(&config);

    // Race the run against ctrl-c. Dropping the run future releases the
    // scratch directory; the output document is then healed below.
    let outcome = tokio::select! {
        result = pipeline.run(&config) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    let summary = match outcome {
        Some(Ok(summary)) => summary,
        Some(Err(e)) => {
            warn!(error = %e, "run aborted, attempting output repair");
            finalize_output(&config.output);
            return Err(e).context("pipeline run failed");
        }
        None => {
            warn!("interrupted, attempting output repair");
            finalize_output(&config.output);
            eprintln!("asmcorpus: interrupted");
            return Ok(ExitCode::from(1));
        }
    };

    print_summary(&summary, &config);

    // Final validation step. The document was closed by the writer; repair
    // on a well-formed run is a no-op that doubles as the parse oracle.
    match repair_file(&config.output, &config.output) {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(CorpusError::Unrepairable { scratch }) => {
            eprintln!(
                "asmcorpus: output written but could not be validated; scratch at {}",
                scratch.display()
            );
            Ok(ExitCode::from(2))
        }
        Err(e) => Err(e).context("final output validation failed"),
    }
}

/// Best-effort close-and-repair after an abnormal termination.
fn finalize_output(output: &std::path::Path) {
    if let Err(e) = heal_output(output) {
        warn!(error = %e, "could not heal output document");
        return;
    }
    match repair_file(output, output) {
        Ok(_) => info!(output = %output.display(), "output document repaired"),
        Err(e) => warn!(error = %e, "output document could not be repaired"),
    }
}

fn print_summary(summary: &RunSummary, config: &RunConfig) {
    println!(
        "processed {} unit(s), {} failed; {} of {} repositories fetched; output: {}",
        summary.processed,
        summary.failed,
        summary.repos_fetched,
        config.repos.len(),
        config.output.display()
    );
}
