//! External tool ports and their real adapters.
//!
//! The orchestrator never shells out directly; it talks to the
//! [`RepoFetcher`], [`Compiler`], [`Disassembler`] and [`JsonValidator`]
//! ports so tests can substitute fakes (see [`crate::fakes`]). The real
//! adapters wrap `git`, `gcc` and `objdump` through `tokio::process` with a
//! timeout on every invocation.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;
use tracing::debug;

use crate::config::Timeouts;
use crate::error::{CorpusError, Result};

/// Shallow-fetch a repository by URL into a local directory.
#[async_trait]
pub trait RepoFetcher: Send + Sync {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Compile one source file into one relocatable object, or fail.
#[async_trait]
pub trait Compiler: Send + Sync {
    async fn compile(&self, source: &Path, include_dir: &Path, object: &Path) -> Result<()>;
}

/// Render an object file's machine code as instruction text.
///
/// Empty output is a failure, never success-with-empty-string.
#[async_trait]
pub trait Disassembler: Send + Sync {
    async fn disassemble(&self, object: &Path) -> Result<String>;
}

/// JSON-validation oracle used by the repair pass.
pub trait JsonValidator: Send + Sync {
    fn validate(&self, text: &str) -> bool;
}

/// Validator backed by `serde_json`.
pub struct SerdeJsonValidator;

impl JsonValidator for SerdeJsonValidator {
    fn validate(&self, text: &str) -> bool {
        serde_json::from_str::<serde_json::Value>(text).is_ok()
    }
}

/// Run one external command to completion, bounded by a timeout.
async fn run_tool(
    tool: &'static str,
    mut command: Command,
    timeout_secs: u64,
) -> Result<std::process::Output> {
    let child = command
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(Stdio::null())
        .spawn()?;

    tokio::time::timeout(Duration::from_secs(timeout_secs), child.wait_with_output())
        .await
        .map_err(|_| CorpusError::Timeout {
            tool: tool.to_string(),
            secs: timeout_secs,
        })?
        .map_err(Into::into)
}

/// `git clone --depth 1` adapter.
pub struct GitFetcher {
    timeout_secs: u64,
}

impl GitFetcher {
    pub fn new(timeouts: Timeouts) -> Self {
        Self {
            timeout_secs: timeouts.fetch_secs,
        }
    }
}

#[async_trait]
impl RepoFetcher for GitFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        let mut command = Command::new("git");
        command
            .arg("clone")
            .arg("--depth")
            .arg("1")
            .arg(url)
            .arg(dest);

        let output = run_tool("git", command, self.timeout_secs).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CorpusError::Fetch {
                url: url.to_string(),
                reason: stderr.trim().to_string(),
            });
        }
        debug!(url, dest = %dest.display(), "fetched repository");
        Ok(())
    }
}

/// `gcc -O0 -std=c17` adapter. Optimizations stay off so the disassembly
/// tracks the source closely.
pub struct GccCompiler {
    timeout_secs: u64,
}

impl GccCompiler {
    pub fn new(timeouts: Timeouts) -> Self {
        Self {
            timeout_secs: timeouts.compile_secs,
        }
    }
}

#[async_trait]
impl Compiler for GccCompiler {
    async fn compile(&self, source: &Path, include_dir: &Path, object: &Path) -> Result<()> {
        let mut command = Command::new("gcc");
        command
            .arg("-O0")
            .arg("-std=c17")
            .arg("-I")
            .arg(include_dir)
            .arg("-c")
            .arg(source)
            .arg("-o")
            .arg(object);

        let output = run_tool("gcc", command, self.timeout_secs).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CorpusError::Compile {
                path: source.to_path_buf(),
                reason: stderr.trim().to_string(),
            });
        }
        if !object.exists() {
            return Err(CorpusError::Compile {
                path: source.to_path_buf(),
                reason: "compiler exited 0 but produced no object file".to_string(),
            });
        }
        Ok(())
    }
}

/// `objdump -d -M intel` adapter, filtered down to instruction lines.
pub struct ObjdumpDisassembler {
    timeout_secs: u64,
    instruction_line: Regex,
}

impl ObjdumpDisassembler {
    pub fn new(timeouts: Timeouts) -> Self {
        Self {
            timeout_secs: timeouts.disassemble_secs,
            // "  1a:\t48 89 e5 \tmov rbp, rsp" — offset, colon, then bytes.
            instruction_line: Regex::new(r"^\s+[0-9a-f]+:\s").expect("static regex"),
        }
    }

    /// Drop blank lines, section banners and symbol headers, keeping only
    /// instruction text.
    fn filter(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        for line in raw.lines() {
            if self.instruction_line.is_match(line) {
                out.push_str(line.trim_end());
                out.push('\n');
            }
        }
        out
    }
}

#[async_trait]
impl Disassembler for ObjdumpDisassembler {
    async fn disassemble(&self, object: &Path) -> Result<String> {
        let mut command = Command::new("objdump");
        command.arg("-d").arg("-M").arg("intel").arg(object);

        let output = run_tool("objdump", command, self.timeout_secs).await?;
        if !output.status.success() {
            return Err(CorpusError::EmptyDisassembly(object.to_path_buf()));
        }

        let text = self.filter(&String::from_utf8_lossy(&output.stdout));
        if text.trim().is_empty() {
            return Err(CorpusError::EmptyDisassembly(object.to_path_buf()));
        }
        Ok(text)
    }
}

/// Probe one tool for presence on PATH.
async fn probe(tool: &'static str) -> Result<()> {
    let mut command = Command::new(tool);
    command.arg("--version");
    match run_tool(tool, command, 10).await {
        Ok(output) if output.status.success() => Ok(()),
        _ => Err(CorpusError::MissingTool(tool.to_string())),
    }
}

/// Verify every external tool the pipeline depends on before any work
/// starts: a missing tool fails the run up front, not mid-ingestion.
pub async fn ensure_toolchain() -> Result<()> {
    probe("git").await?;
    probe("gcc").await?;
    probe("objdump").await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Timeouts;

    #[test]
    fn test_serde_validator() {
        let v = SerdeJsonValidator;
        assert!(v.validate("[{\"a\":1}]"));
        assert!(v.validate("[]"));
        assert!(!v.validate("[{\"a\":1},"));
        assert!(!v.validate(""));
    }

    #[test]
    fn test_objdump_filter_keeps_only_instructions() {
        let disasm = ObjdumpDisassembler::new(Timeouts::default());
        let raw = "\n\
            out.o:     file format elf64-x86-64\n\
            \n\
            Disassembly of section .text:\n\
            \n\
            0000000000000000 <main>:\n\
            \x20  0:\t55                   \tpush   rbp\n\
            \x20  1:\t48 89 e5             \tmov    rbp,rsp\n\
            \n";
        let filtered = disasm.filter(raw);
        assert_eq!(filtered.lines().count(), 2);
        assert!(filtered.contains("push"));
        assert!(!filtered.contains("file format"));
        assert!(!filtered.contains("<main>"));
        assert!(!filtered.contains("Disassembly"));
    }

    #[test]
    fn test_objdump_filter_empty_input() {
        let disasm = ObjdumpDisassembler::new(Timeouts::default());
        assert!(disasm.filter("no instructions here\n").is_empty());
    }

    #[tokio::test]
    async fn test_probe_missing_tool() {
        let err = probe("definitely-not-a-real-tool-xyz").await.unwrap_err();
        assert!(matches!(err, CorpusError::MissingTool(_)));
    }

    #[tokio::test]
    async fn test_git_fetch_local_path() {
        // git clones from a plain local path as well as a URL.
        let upstream = tempfile::tempdir().unwrap();
        let run = |args: &[&str]| {
            let output = std::process::Command::new("git")
                .args(args)
                .current_dir(upstream.path())
                .output()
                .unwrap();
            assert!(
                output.status.success(),
                "git {:?} failed: {}",
                args,
                String::from_utf8_lossy(&output.stderr)
            );
        };
        run(&["init"]);
        run(&["config", "user.name", "test-user"]);
        run(&["config", "user.email", "test@example.com"]);
        std::fs::write(upstream.path().join("main.c"), "int main(void){return 0;}\n")
            .unwrap();
        run(&["add", "."]);
        run(&["commit", "-m", "initial"]);

        let fetcher = GitFetcher::new(Timeouts::default());
        let dest = tempfile::tempdir().unwrap();
        let clone_dir = dest.path().join("clone");
        fetcher
            .fetch(upstream.path().to_str().unwrap(), &clone_dir)
            .await
            .unwrap();
        assert!(clone_dir.join("main.c").exists());
    }

    #[tokio::test]
    async fn test_git_fetch_bad_url_is_fetch_error() {
        let fetcher = GitFetcher::new(Timeouts {
            fetch_secs: 30,
            ..Timeouts::default()
        });
        let dest = tempfile::tempdir().unwrap();
        let err = fetcher
            .fetch("/nonexistent/not-a-repo", &dest.path().join("clone"))
            .await
            .unwrap_err();
        assert!(matches!(err, CorpusError::Fetch { .. }));
    }
}
