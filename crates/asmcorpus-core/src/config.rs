//! Run configuration: the repository list, output path, and tool timeouts.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Repositories mined by default when no explicit list is supplied.
///
/// Small, permissively licensed C codebases with mostly self-contained
/// translation units, so a plain `gcc -c` from the repository root has a
/// reasonable hit rate.
pub const DEFAULT_REPOS: &[&str] = &[
    "https://github.com/DaveGamble/cJSON",
    "https://github.com/zserge/jsmn",
    "https://github.com/rxi/log.c",
    "https://github.com/clibs/buffer",
    "https://github.com/troydhanson/uthash",
];

/// Reference to one repository to mine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepoRef {
    /// Clone URL.
    pub url: String,
}

impl RepoRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Short name derived from the URL: final path segment, `.git` stripped.
    pub fn short_name(&self) -> String {
        let tail = self
            .url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or("repo");
        tail.strip_suffix(".git").unwrap_or(tail).to_string()
    }
}

/// Timeouts applied to external tool invocations, in seconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Timeouts {
    pub fetch_secs: u64,
    pub compile_secs: u64,
    pub disassemble_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            fetch_secs: 300,
            compile_secs: 60,
            disassemble_secs: 30,
        }
    }
}

/// Configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Repositories to fetch and mine, in order.
    pub repos: Vec<RepoRef>,

    /// Path of the JSON array output document.
    pub output: PathBuf,

    /// Extension of source files to enumerate (without the dot).
    pub source_extension: String,

    /// External tool timeouts.
    pub timeouts: Timeouts,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            repos: DEFAULT_REPOS.iter().copied().map(RepoRef::new).collect(),
            output: PathBuf::from("output.json"),
            source_extension: "c".to_string(),
            timeouts: Timeouts::default(),
        }
    }
}
