//! Copy selected files into a staging directory, then route them into the
//! collection.
//!
//! Staging keeps the card read-only from the start: nothing lands in the
//! collection until every file has been copied off.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use super::{
    media::{MediaRules, Subcollection},
    plan::route_target,
};
use crate::{
    error::{IoContext, Result},
    fsutil::{copy_preserving_mtime, move_file, unique_destination},
};

/// Remove `dir` if present and create it empty.
pub fn prepare_staging(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir).at(dir)?;
    }
    fs::create_dir_all(dir).at(dir)
}

/// Remove the staging directory and anything left in it.
pub fn cleanup_staging(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir).at(dir)?;
    }
    Ok(())
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StageReport {
    /// Paths inside the staging directory, in copy order.
    pub staged: Vec<PathBuf>,
    pub bytes: u64,
    /// Card path and error message for every file that could not be copied.
    pub failures: Vec<(PathBuf, String)>,
}

/// Copy `files` flat into `staging`, preserving modification times.
///
/// Files with the same name get `-1`, `-2`, … suffixes. `progress` is called
/// with the size of each copied file.
pub fn stage_files(
    files: &[PathBuf],
    staging: &Path,
    mut progress: impl FnMut(u64),
) -> StageReport {
    let mut report = StageReport::default();
    for src in files {
        let Some(name) = src.file_name() else {
            continue;
        };
        let dst = unique_destination(&staging.join(name));
        match copy_preserving_mtime(src, &dst) {
            Ok(bytes) => {
                debug!(from = %src.display(), to = %dst.display(), bytes, "staged");
                report.bytes += bytes;
                report.staged.push(dst);
                progress(bytes);
            },
            Err(e) => {
                warn!(path = %src.display(), "{e}");
                report.failures.push((src.clone(), e.to_string()));
            },
        }
    }
    report
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RouteReport {
    /// Files moved into each subcollection.
    pub dumped: BTreeMap<Subcollection, usize>,
    /// Destinations that already existed and were left alone.
    pub skipped: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, String)>,
}

impl RouteReport {
    pub fn total(&self) -> usize {
        self.dumped.values().sum()
    }

    /// `Photo: 3, Video: 1` style one-liner, plus the skip count.
    pub fn summary(&self) -> String {
        let mut parts: Vec<String> = self
            .dumped
            .iter()
            .map(|(sub, n)| format!("{sub}: {n}"))
            .collect();
        if !self.skipped.is_empty() {
            parts.push(format!("skipped: {}", self.skipped.len()));
        }
        if parts.is_empty() {
            "nothing dumped".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Move staged files into `<collection>/<subcollection>/`.
///
/// An existing destination is never overwritten; the staged copy is left in
/// place and reported as skipped.
pub fn route_files(staged: &[PathBuf], collection: &Path, rules: &MediaRules) -> RouteReport {
    let mut report = RouteReport::default();
    for src in staged {
        let (Some(sub), Some(name)) = (rules.classify(src), src.file_name()) else {
            continue;
        };
        let dst = route_target(collection, sub, Path::new(name));
        if dst.exists() {
            warn!(path = %dst.display(), "already exists, not overwriting");
            report.skipped.push(dst);
            continue;
        }
        let moved = dst
            .parent()
            .map_or(Ok(()), |parent| fs::create_dir_all(parent).at(parent))
            .and_then(|()| move_file(src, &dst));
        match moved {
            Ok(()) => {
                debug!(to = %dst.display(), "routed");
                *report.dumped.entry(sub).or_default() += 1;
            },
            Err(e) => {
                warn!(path = %src.display(), "{e}");
                report.failures.push((src.clone(), e.to_string()));
            },
        }
    }
    report
}
