//! Subcommand handlers.
//!
//! Each file in this module corresponds to one user-facing command:
//!
//! | File          | Invocation          | Description                           |
//! |---------------|---------------------|---------------------------------------|
//! | `init.rs`     | `mediakit init`     | Scaffold a `mediakit.toml`            |
//! | `dump.rs`     | `mediakit dump`     | Copy a day's media off an SD card     |
//! | `backup.rs`   | `mediakit backup`   | Three-way diff backup                 |

pub mod backup;
pub mod dump;
pub mod init;

use std::path::PathBuf;

use crate::ui::StageOutcome;

/// Outcome of a stage that processes many files and keeps going past
/// individual failures.
fn file_outcome(label: &str, detail: String, failures: &[(PathBuf, String)]) -> StageOutcome {
    if failures.is_empty() {
        return StageOutcome::ok(label, detail);
    }
    let lines = failures
        .iter()
        .map(|(path, err)| format!("{}: {err}", path.display()))
        .collect::<Vec<_>>()
        .join("\n");
    let noun = if failures.len() == 1 { "file" } else { "files" };
    StageOutcome::failure(label, format!("{} {noun} failed", failures.len()), lines)
}
