//! Output repair pass: closes and cleans a JSON-array document.
//!
//! Two entry points:
//! - [`heal_output`], the cheap self-heal run when a pipeline terminates
//!   abnormally: appends the closing bracket if it is missing.
//! - [`repair_file`], the standalone idempotent repair: strips dangling
//!   separators, closes the array, and validates the result before it is
//!   allowed to replace the target.
//!
//! Repair is conservative. It operates on a scratch copy and only commits a
//! result that parses as valid JSON; an irreparable document leaves the
//! target untouched and the scratch copy on disk for inspection.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{CorpusError, Result};
use crate::tools::{JsonValidator, SerdeJsonValidator};

/// Individual edit applied by the repair pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RepairAction {
    StrippedTrailingComma,
    StrippedCommaBeforeBracket,
    AppendedClosingBracket,
}

/// Outcome of a successful repair attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RepairOutcome {
    /// Input already parsed; nothing was changed.
    AlreadyValid,

    /// Edits were applied and the result validated.
    Repaired { actions: Vec<RepairAction> },
}

/// Scratch path for a repair attempt, derived from the target path.
pub fn scratch_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(".repair");
    PathBuf::from(name)
}

/// Best-effort self-heal for an abnormally terminated run: append the closing
/// bracket unless the last non-empty line is already exactly `]`.
///
/// A missing output file means there is nothing to heal.
pub fn heal_output(path: &Path) -> Result<()> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    let last_line = text.trim_end().lines().last().map(str::trim);
    if last_line == Some("]") {
        return Ok(());
    }

    let mut file = fs::OpenOptions::new().append(true).open(path)?;
    file.write_all(b"\n]\n")?;
    warn!(path = %path.display(), "output was not closed, appended closing bracket");
    Ok(())
}

/// Repair `input` into `output` (in-place when the paths are equal).
///
/// Edits, in order: strip a trailing comma at end of file, strip any comma
/// immediately preceding a closing bracket, append a closing bracket if the
/// document does not end with one. The result must parse as JSON before it
/// replaces `output`; otherwise the scratch copy is left on disk and a
/// [`CorpusError::Unrepairable`] carrying its path is returned.
pub fn repair_file(input: &Path, output: &Path) -> Result<RepairOutcome> {
    repair_file_with(input, output, &SerdeJsonValidator)
}

/// [`repair_file`] with an injected JSON-validation oracle.
pub fn repair_file_with(
    input: &Path,
    output: &Path,
    validator: &dyn JsonValidator,
) -> Result<RepairOutcome> {
    let original = fs::read_to_string(input)?;

    if validator.validate(&original) {
        if output != input {
            fs::write(output, &original)?;
        }
        info!(input = %input.display(), "document already valid, no repair needed");
        return Ok(RepairOutcome::AlreadyValid);
    }

    let (repaired, actions) = repair_text(&original);

    let scratch = scratch_path(output);
    fs::write(&scratch, &repaired)?;

    if !validator.validate(&repaired) {
        warn!(
            input = %input.display(),
            scratch = %scratch.display(),
            "repair could not produce valid JSON, target left untouched"
        );
        return Err(CorpusError::Unrepairable { scratch });
    }

    fs::write(output, &repaired)?;
    fs::remove_file(&scratch)?;
    info!(
        output = %output.display(),
        ?actions,
        "repaired document validated and committed"
    );
    Ok(RepairOutcome::Repaired { actions })
}

/// Pure text transform behind the repair pass.
fn repair_text(original: &str) -> (String, Vec<RepairAction>) {
    let mut actions = Vec::new();
    let mut text = original.trim_end().to_string();

    if text.ends_with(',') {
        text.pop();
        text = text.trim_end().to_string();
        actions.push(RepairAction::StrippedTrailingComma);
    }

    // A separator directly before a closing bracket is never valid JSON, so
    // this only touches documents a crashed writer or prior tool left behind.
    let dangling = Regex::new(r",\s*\]").expect("static regex");
    if dangling.is_match(&text) {
        text = dangling.replace_all(&text, "]").into_owned();
        actions.push(RepairAction::StrippedCommaBeforeBracket);
    }

    if !text.ends_with(']') {
        text.push_str("\n]");
        actions.push(RepairAction::AppendedClosingBracket);
    }

    text.push('\n');
    (text, actions)
}
