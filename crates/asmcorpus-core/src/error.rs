//! Error taxonomy for the asmcorpus pipeline.
//!
//! Fatal preconditions (missing tools, unwritable paths) abort a run before
//! any work starts; everything else is caught per repository or per source
//! unit by the orchestrator, logged, and counted.

use std::path::PathBuf;

/// Errors produced by the dataset pipeline.
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("required tool not found on PATH: {0}")]
    MissingTool(String),

    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("compile failed for {path}: {reason}")]
    Compile { path: PathBuf, reason: String },

    #[error("disassembly produced no instructions for {0}")]
    EmptyDisassembly(PathBuf),

    #[error("record field must not be empty: {0}")]
    EmptyField(&'static str),

    #[error("{tool} timed out after {secs}s")]
    Timeout { tool: String, secs: u64 },

    #[error("document could not be repaired to valid JSON, scratch left at {scratch}")]
    Unrepairable { scratch: PathBuf },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, CorpusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CorpusError::MissingTool("gcc".to_string());
        assert!(err.to_string().contains("gcc"));

        let err = CorpusError::Fetch {
            url: "https://example.com/repo.git".to_string(),
            reason: "exit code 128".to_string(),
        };
        assert!(err.to_string().contains("repo.git"));
        assert!(err.to_string().contains("128"));
    }

    #[test]
    fn test_timeout_error() {
        let err = CorpusError::Timeout {
            tool: "gcc".to_string(),
            secs: 60,
        };
        let msg = err.to_string();
        assert!(msg.contains("gcc"));
        assert!(msg.contains("60"));
    }

    #[test]
    fn test_unrepairable_carries_scratch_path() {
        let err = CorpusError::Unrepairable {
            scratch: PathBuf::from("/tmp/output.json.repair"),
        };
        assert!(err.to_string().contains("output.json.repair"));
    }
}
