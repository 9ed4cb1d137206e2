//! The dataset record: one (code, assembly) pair destined for output.

use serde::{Deserialize, Serialize};

use crate::error::{CorpusError, Result};

/// One labeled dataset entry, immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatasetRecord {
    /// Normalised source text.
    pub code: String,

    /// Filtered disassembly text.
    pub assembly: String,
}

impl DatasetRecord {
    /// Construct a record, rejecting empty fields.
    ///
    /// An empty code or assembly field must never reach the output document,
    /// so construction is the enforcement point.
    pub fn new(code: String, assembly: String) -> Result<Self> {
        if code.trim().is_empty() {
            return Err(CorpusError::EmptyField("code"));
        }
        if assembly.trim().is_empty() {
            return Err(CorpusError::EmptyField("assembly"));
        }
        Ok(Self { code, assembly })
    }

    /// Serialize to a single JSON object literal, quotes, backslashes and
    /// control characters escaped.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
