//! Source text normalisation for dataset records.
//!
//! Strips comments and blank lines from the text embedded in a record.
//! Deliberately line-oriented and lossy: a block comment spanning lines has
//! only its delimiters removed, and a `*/` inside a string literal will
//! truncate the line. Compilation always runs on the untouched file.

/// Normalise raw source text before it is embedded in a dataset record.
pub fn normalize_source(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for line in raw.lines() {
        let line = strip_line_comment(line);
        let line = strip_block_delimiters(&line);
        let trimmed = line.trim_end();
        if trimmed.trim().is_empty() {
            continue;
        }
        out.push_str(trimmed);
        out.push('\n');
    }
    out
}

/// Cut a line at the first `//`.
fn strip_line_comment(line: &str) -> String {
    match line.find("//") {
        Some(idx) => line[..idx].to_string(),
        None => line.to_string(),
    }
}

/// Excise same-line `/* ... */` spans and drop any stray delimiters.
fn strip_block_delimiters(line: &str) -> String {
    let mut s = line.to_string();
    while let (Some(open), Some(close)) = (s.find("/*"), s.find("*/")) {
        if close > open {
            s.replace_range(open..close + 2, "");
        } else {
            break;
        }
    }
    s.replace("/*", "").replace("*/", "")
}
