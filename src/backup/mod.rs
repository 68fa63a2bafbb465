//! Three-way diff backup: make a target directory mirror a source.
//!
//! The work is split the same way the command runs it:
//!
//! | Module        | Step                                            |
//! |---------------|-------------------------------------------------|
//! | (this file)   | validate the roots, scan both trees             |
//! | [`plan`]      | classify files into copy / replace / delete     |
//! | [`execute`]   | apply a phase, collecting per-file failures     |
//! | [`changelog`] | CSV row per action                              |
//! | [`ledger`]    | "last update" date entry                        |

pub mod changelog;
pub mod execute;
pub mod ledger;
pub mod plan;

use std::path::{Path, PathBuf};

pub use execute::{Backup, Disposal, PhaseReport};
pub use plan::{Action, BackupPlan};

use crate::{
    error::{IoContext, Result, ToolkitError},
    fsutil::{FileEntry, ensure_dirs, scan_tree},
};

/// Both roots must be existing directories, neither inside the other.
///
/// A source under the target would show up in the target scan and be
/// deleted; a target under the source would be copied into itself.
pub fn validate(source: &Path, target: &Path) -> Result<()> {
    ensure_dirs(&[source, target])?;
    let source = source.canonicalize().at(source)?;
    let target = target.canonicalize().at(target)?;
    if source == target {
        return Err(ToolkitError::SameDirectory(source));
    }
    let nested = if source.starts_with(&target) {
        Some((source, target))
    } else if target.starts_with(&source) {
        Some((target, source))
    } else {
        None
    };
    match nested {
        Some((inner, outer)) => Err(ToolkitError::NestedDirectories { inner, outer }),
        None => Ok(()),
    }
}

/// Scan source and target.
pub fn scan(
    source: &Path,
    target: &Path,
    include_hidden: bool,
) -> Result<(Vec<FileEntry>, Vec<FileEntry>)> {
    Ok((scan_tree(source, include_hidden)?, scan_tree(target, include_hidden)?))
}

/// Where the ledger for `target` lives: `ledger_file` as-is when absolute,
/// otherwise next to the target directory.
pub fn ledger_path(target: &Path, ledger_file: &Path) -> PathBuf {
    if ledger_file.is_absolute() {
        return ledger_file.to_path_buf();
    }
    target
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(ledger_file)
}
