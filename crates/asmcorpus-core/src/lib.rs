//! asmcorpus core library
//!
//! Builds a labeled dataset pairing C source snippets with their compiled
//! disassembly: fetch repositories, compile each translation unit,
//! disassemble the object, and stream `{code, assembly}` records into one
//! JSON array, with a repair pass that keeps the output parseable through
//! partial failures and interruption.

pub mod config;
pub mod enumerate;
pub mod error;
pub mod fakes;
pub mod normalize;
pub mod pipeline;
pub mod record;
pub mod repair;
pub mod telemetry;
pub mod tools;
pub mod writer;

pub use config::{RepoRef, RunConfig, Timeouts, DEFAULT_REPOS};
pub use enumerate::enumerate_sources;
pub use error::{CorpusError, Result};
pub use normalize::normalize_source;
pub use pipeline::{Pipeline, RunSummary};
pub use record::DatasetRecord;
pub use repair::{heal_output, repair_file, repair_file_with, RepairAction, RepairOutcome};
pub use telemetry::init_tracing;
pub use tools::{
    ensure_toolchain, Compiler, Disassembler, GccCompiler, GitFetcher, JsonValidator,
    ObjdumpDisassembler, RepoFetcher, SerdeJsonValidator,
};
pub use writer::ArrayWriter;

/// asmcorpus version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
