//! In-memory fakes for the tool ports (testing only).
//!
//! Provides `FakeFetcher`, `FakeCompiler` and `FakeDisassembler` that satisfy
//! the port contracts without invoking git, gcc or objdump. Behavior is keyed
//! off markers in file content so a test can describe an entire repository as
//! plain text:
//!
//! - a source containing `COMPILE_ERROR` fails compilation;
//! - a source containing `EMPTY_ASM` compiles but disassembles to nothing.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{CorpusError, Result};
use crate::tools::{Compiler, Disassembler, RepoFetcher};

/// Marker that makes [`FakeCompiler`] reject a source file.
pub const COMPILE_ERROR_MARKER: &str = "COMPILE_ERROR";

/// Marker that makes [`FakeDisassembler`] produce empty output.
pub const EMPTY_ASM_MARKER: &str = "EMPTY_ASM";

/// Fetcher backed by a map from URL to repository contents.
///
/// URLs not registered (or registered as unreachable) fail with
/// [`CorpusError::Fetch`].
#[derive(Debug, Default)]
pub struct FakeFetcher {
    repos: Mutex<HashMap<String, Option<Vec<(String, String)>>>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fetchable repository as (relative path, content) pairs.
    pub fn with_repo(self, url: &str, files: &[(&str, &str)]) -> Self {
        self.repos.lock().unwrap().insert(
            url.to_string(),
            Some(
                files
                    .iter()
                    .map(|(p, c)| (p.to_string(), c.to_string()))
                    .collect(),
            ),
        );
        self
    }

    /// Register a URL whose fetch always fails.
    pub fn with_unreachable(self, url: &str) -> Self {
        self.repos.lock().unwrap().insert(url.to_string(), None);
        self
    }
}

#[async_trait]
impl RepoFetcher for FakeFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        let files = {
            let repos = self.repos.lock().unwrap();
            repos.get(url).cloned()
        };
        match files {
            Some(Some(files)) => {
                for (rel, content) in files {
                    let path = dest.join(rel);
                    if let Some(parent) = path.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    fs::write(path, content)?;
                }
                Ok(())
            }
            _ => Err(CorpusError::Fetch {
                url: url.to_string(),
                reason: "unreachable".to_string(),
            }),
        }
    }
}

/// Compiler that copies source text into the object file, failing on the
/// [`COMPILE_ERROR_MARKER`].
#[derive(Debug, Default)]
pub struct FakeCompiler;

#[async_trait]
impl Compiler for FakeCompiler {
    async fn compile(&self, source: &Path, _include_dir: &Path, object: &Path) -> Result<()> {
        let text = fs::read_to_string(source)?;
        if text.contains(COMPILE_ERROR_MARKER) {
            return Err(CorpusError::Compile {
                path: source.to_path_buf(),
                reason: "synthetic compile error".to_string(),
            });
        }
        fs::write(object, text)?;
        Ok(())
    }
}

/// Disassembler that derives output from the fake object's content,
/// producing empty output on the [`EMPTY_ASM_MARKER`].
#[derive(Debug, Default)]
pub struct FakeDisassembler;

#[async_trait]
impl Disassembler for FakeDisassembler {
    async fn disassemble(&self, object: &Path) -> Result<String> {
        let text = fs::read_to_string(object)?;
        if text.contains(EMPTY_ASM_MARKER) {
            return Err(CorpusError::EmptyDisassembly(object.to_path_buf()));
        }
        Ok("push   rbp\nmov    rbp,rsp\nret\n".to_string())
    }
}
