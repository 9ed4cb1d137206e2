//! Pipeline orchestration: repositories → files → compile → disassemble →
//! serialize → append.
//!
//! The orchestrator is the failure boundary. Fatal preconditions (scratch
//! directory, output file) abort the run; everything per-repository or
//! per-unit is logged, counted and skipped. Counters live in the returned
//! [`RunSummary`], not in globals.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::RunConfig;
use crate::enumerate::enumerate_sources;
use crate::error::Result;
use crate::normalize::normalize_source;
use crate::record::DatasetRecord;
use crate::tools::{Compiler, Disassembler, GccCompiler, GitFetcher, ObjdumpDisassembler, RepoFetcher};
use crate::writer::ArrayWriter;

/// Counters for one pipeline run. Diagnostics only; correctness of the
/// output document never depends on them.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunSummary {
    /// Records appended to the output document.
    pub processed: u64,

    /// Source units that failed at any stage (compile, disassemble,
    /// normalize, serialize).
    pub failed: u64,

    /// Repositories fetched and enumerated.
    pub repos_fetched: u64,

    /// Repositories skipped (fetch failure or enumeration failure).
    pub repos_failed: u64,
}

/// The dataset pipeline, parameterised over its external tool ports.
pub struct Pipeline {
    fetcher: Arc<dyn RepoFetcher>,
    compiler: Arc<dyn Compiler>,
    disassembler: Arc<dyn Disassembler>,
}

impl Pipeline {
    /// Build a pipeline over explicit ports (tests inject fakes here).
    pub fn new(
        fetcher: Arc<dyn RepoFetcher>,
        compiler: Arc<dyn Compiler>,
        disassembler: Arc<dyn Disassembler>,
    ) -> Self {
        Self {
            fetcher,
            compiler,
            disassembler,
        }
    }

    /// Build a pipeline over the real git/gcc/objdump adapters.
    pub fn with_real_tools(config: &RunConfig) -> Self {
        Self::new(
            Arc::new(GitFetcher::new(config.timeouts)),
            Arc::new(GccCompiler::new(config.timeouts)),
            Arc::new(ObjdumpDisassembler::new(config.timeouts)),
        )
    }

    /// Drive the full run.
    ///
    /// Strictly sequential: one repository, one source unit, one writer.
    /// The scratch directory is acquired up front and removed on every exit
    /// path when the `TempDir` guard drops. On a fatal mid-run error the
    /// output document is left unclosed; the caller is responsible for
    /// invoking the repair pass.
    pub async fn run(&self, config: &RunConfig) -> Result<RunSummary> {
        let scratch = tempfile::tempdir()?;
        let mut writer = ArrayWriter::create(&config.output)?;
        let mut summary = RunSummary::default();

        for repo in &config.repos {
            let name = repo.short_name();
            let repo_dir = scratch.path().join("repos").join(&name);

            info!(repo = %name, url = %repo.url, "fetching repository");
            if let Err(e) = self.fetcher.fetch(&repo.url, &repo_dir).await {
                warn!(repo = %name, error = %e, "fetch failed, skipping repository");
                summary.repos_failed += 1;
                continue;
            }

            let sources = match enumerate_sources(&repo_dir, &config.source_extension) {
                Ok(sources) => sources,
                Err(e) => {
                    warn!(repo = %name, error = %e, "enumeration failed, skipping repository");
                    summary.repos_failed += 1;
                    continue;
                }
            };
            summary.repos_fetched += 1;

            if sources.is_empty() {
                info!(repo = %name, "no source files found, skipping repository");
                continue;
            }
            info!(repo = %name, units = sources.len(), "compiling source units");

            for source in &sources {
                match self.build_record(source, &repo_dir, scratch.path()).await {
                    Ok(json) => {
                        writer.append(&json)?;
                        summary.processed += 1;
                    }
                    Err(e) => {
                        warn!(source = %source.display(), error = %e, "unit failed");
                        summary.failed += 1;
                    }
                }
            }
        }

        writer.close()?;
        info!(
            processed = summary.processed,
            failed = summary.failed,
            repos_fetched = summary.repos_fetched,
            repos_failed = summary.repos_failed,
            "run complete"
        );
        Ok(summary)
    }

    /// Take one source unit through compile → disassemble → normalize →
    /// serialize, returning the record's JSON text.
    ///
    /// The build artifact gets a unique name and is deleted as soon as its
    /// disassembly has been extracted, success or failure, so the scratch
    /// directory never grows across thousands of units.
    async fn build_record(
        &self,
        source: &Path,
        repo_dir: &Path,
        scratch_dir: &Path,
    ) -> Result<String> {
        let object = scratch_dir.join(format!("obj-{}.o", Uuid::new_v4()));

        self.compiler.compile(source, repo_dir, &object).await?;
        let disassembly = self.disassembler.disassemble(&object).await;
        let _ = fs::remove_file(&object);
        let assembly = disassembly?;

        let raw = fs::read_to_string(source)?;
        let code = normalize_source(&raw);

        let record = DatasetRecord::new(code, assembly)?;
        record.to_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RepoRef;
    use crate::fakes::{FakeCompiler, FakeDisassembler, FakeFetcher};

    fn pipeline_with(fetcher: FakeFetcher) -> Pipeline {
        Pipeline::new(
            Arc::new(fetcher),
            Arc::new(FakeCompiler),
            Arc::new(FakeDisassembler),
        )
    }

    fn config_for(urls: &[&str], output: std::path::PathBuf) -> RunConfig {
        RunConfig {
            repos: urls.iter().copied().map(RepoRef::new).collect(),
            output,
            ..RunConfig::default()
        }
    }

    #[tokio::test]
    async fn test_empty_repo_list_yields_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.json");
        let pipeline = pipeline_with(FakeFetcher::new());

        let summary = pipeline.run(&config_for(&[], output.clone())).await.unwrap();
        assert_eq!(summary, RunSummary::default());

        let text = fs::read_to_string(&output).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_multiple_units_all_processed() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.json");
        let fetcher = FakeFetcher::new().with_repo(
            "https://example.com/repo",
            &[
                ("a.c", "int a(void){return 1;}\n"),
                ("b.c", "int b(void){return 2;}\n"),
            ],
        );
        let pipeline = pipeline_with(fetcher);
        let summary = pipeline
            .run(&config_for(&["https://example.com/repo"], output))
            .await
            .unwrap();
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.failed, 0);
    }

    #[tokio::test]
    async fn test_repo_with_no_sources_is_skipped_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.json");
        let fetcher = FakeFetcher::new()
            .with_repo("https://example.com/docs-only", &[("README.md", "docs\n")]);
        let pipeline = pipeline_with(fetcher);

        let summary = pipeline
            .run(&config_for(&["https://example.com/docs-only"], output.clone()))
            .await
            .unwrap();
        assert_eq!(summary.repos_fetched, 1);
        assert_eq!(summary.processed, 0);

        let text = fs::read_to_string(&output).unwrap();
        assert!(serde_json::from_str::<serde_json::Value>(&text).is_ok());
    }
}
