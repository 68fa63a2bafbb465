//! Apply a [`BackupPlan`] to the filesystem, one phase at a time.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use super::{
    changelog::{ChangeLog, logged_path},
    plan::{Action, BackupPlan},
};
use crate::{
    config::BackupConfig,
    error::{IoContext, Result, ToolkitError},
    fsutil::{copy_preserving_mtime, move_file, unique_destination},
};

/// Where a deleted target file goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposal<'a> {
    /// The platform trash (Trash, Recycle Bin, freedesktop trash).
    SystemTrash,
    /// Moved under this directory, keeping its relative path.
    TrashDir(&'a Path),
    /// Removed outright.
    Remove,
}

impl<'a> Disposal<'a> {
    /// `trash_dir` wins over `permanent_delete`; neither means the system
    /// trash.
    pub fn from_config(cfg: &'a BackupConfig) -> Self {
        match (&cfg.trash_dir, cfg.permanent_delete) {
            (Some(dir), _) => Self::TrashDir(dir),
            (None, true) => Self::Remove,
            (None, false) => Self::SystemTrash,
        }
    }

    fn dispose(self, path: &Path, rel: &Path) -> Result<()> {
        match self {
            Self::SystemTrash => trash::delete(path).map_err(|source| ToolkitError::Trash {
                path: path.to_path_buf(),
                source,
            }),
            Self::TrashDir(dir) => {
                let dest = unique_destination(&dir.join(rel));
                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent).at(parent)?;
                }
                move_file(path, &dest)
            },
            Self::Remove => fs::remove_file(path).at(path),
        }
    }
}

/// The two roots of a backup plus where deleted files go.
#[derive(Debug, Clone, Copy)]
pub struct Backup<'a> {
    pub source: &'a Path,
    pub target: &'a Path,
    pub disposal: Disposal<'a>,
}

/// What one phase did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PhaseReport {
    pub done: usize,
    pub bytes: u64,
    /// Relative path and error message for every file that failed.
    pub failures: Vec<(PathBuf, String)>,
}

impl PhaseReport {
    pub fn failed(&self) -> bool {
        !self.failures.is_empty()
    }
}

impl Backup<'_> {
    /// Apply one action to one relative path. Returns the bytes involved.
    pub fn apply(&self, action: Action, rel: &Path) -> Result<u64> {
        let src = self.source.join(rel);
        let dst = self.target.join(rel);
        match action {
            Action::Copy | Action::Replace => {
                if let Some(parent) = dst.parent() {
                    fs::create_dir_all(parent).at(parent)?;
                }
                copy_preserving_mtime(&src, &dst)
            },
            Action::Delete => {
                let size = fs::metadata(&dst).at(&dst)?.len();
                self.disposal.dispose(&dst, rel)?;
                Ok(size)
            },
        }
    }

    /// Run every `action` in `plan`, logging and continuing past per-file
    /// failures. `progress` is called with the bytes of each finished file.
    pub fn run_phase(
        &self,
        plan: &BackupPlan,
        action: Action,
        mut log: Option<&mut ChangeLog>,
        mut progress: impl FnMut(u64),
    ) -> PhaseReport {
        let mut report = PhaseReport::default();
        for rel in plan.paths(action) {
            match self.apply(action, rel) {
                Ok(bytes) => {
                    debug!(action = %action, path = %rel.display(), bytes, "done");
                    report.done += 1;
                    report.bytes += bytes;
                    progress(bytes);

                    if let Some(log) = log.as_deref_mut() {
                        let fname = logged_path(action, self.source, self.target, rel);
                        if let Err(e) = log.record(action, &fname) {
                            warn!(path = %rel.display(), "could not write change log: {e}");
                            report.failures.push((rel.clone(), format!("change log: {e}")));
                        }
                    }
                },
                Err(e) => {
                    warn!(action = %action, path = %rel.display(), "{e}");
                    report.failures.push((rel.clone(), e.to_string()));
                },
            }
        }
        info!(
            action = %action,
            done = report.done,
            failed = report.failures.len(),
            bytes = report.bytes,
            "phase finished"
        );
        report
    }
}
