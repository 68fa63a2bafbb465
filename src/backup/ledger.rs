//! "Last update" ledger: a small YAML-ish file listing backup dates per
//! media section.
//!
//! ```text
//! photos:
//!   - 2024-01-02
//!   - 2024-02-10
//! music:
//!   - 2023-12-24
//! ```
//!
//! Only line insertion is done here; the file is never parsed as YAML so
//! hand-written comments and formatting survive.

use std::{fs, path::Path};

use chrono::NaiveDate;

use crate::error::{IoContext, Result};

/// The ledger section a target directory belongs to: its lowercased
/// basename, if that is one of `sections`.
pub fn section_for(target: &Path, sections: &[String]) -> Option<String> {
    let name = target.file_name()?.to_str()?.to_lowercase();
    sections
        .iter()
        .any(|s| s.eq_ignore_ascii_case(&name))
        .then_some(name)
}

/// Trimmed, lowercased and colon-stripped, in that order: `photos :` is not
/// a heading.
fn is_heading(line: &str, section: &str) -> bool {
    line.trim().to_lowercase().replace(':', "") == section
}

/// Insert `  - <date>` right after the last heading line for `section`.
///
/// Returns `None` when no line matches, so the caller can leave the file
/// untouched.
pub fn insert_entry(text: &str, section: &str, date: NaiveDate) -> Option<String> {
    let section = section.to_lowercase();
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let idx = lines.iter().rposition(|l| is_heading(l, &section))?;

    let mut out = String::with_capacity(text.len() + 16);
    for (i, line) in lines.iter().enumerate() {
        out.push_str(line);
        if i == idx {
            if !line.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&format!("  - {}\n", date.format("%Y-%m-%d")));
        }
    }
    Some(out)
}

/// Add a `date` entry under `section` in the ledger at `path`.
///
/// Returns whether the file was changed. A missing file or a file without
/// the section is left alone.
pub fn update(path: &Path, section: &str, date: NaiveDate) -> Result<bool> {
    if !path.is_file() {
        return Ok(false);
    }
    let text = fs::read_to_string(path).at(path)?;
    match insert_entry(&text, section, date) {
        Some(updated) => {
            fs::write(path, updated).at(path)?;
            Ok(true)
        },
        None => Ok(false),
    }
}
