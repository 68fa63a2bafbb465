//! Three-way comparison of a source and target listing.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

use crate::fsutil::FileEntry;

/// One execution phase of a backup, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    Copy,
    Replace,
    Delete,
}

impl Action {
    pub const ALL: [Self; 3] = [Self::Copy, Self::Replace, Self::Delete];

    /// One-letter code written to the change log.
    pub const fn code(self) -> char {
        match self {
            Self::Copy => 'c',
            Self::Replace => 'r',
            Self::Delete => 'd',
        }
    }

    /// Upper-case heading used in the plan summary.
    pub const fn gerund(self) -> &'static str {
        match self {
            Self::Copy => "COPYING",
            Self::Replace => "REPLACING",
            Self::Delete => "DELETING",
        }
    }

    /// Stage label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Copy => "Copy",
            Self::Replace => "Replace",
            Self::Delete => "Delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What a backup would do. Every list holds paths relative to the source
/// and target roots, sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackupPlan {
    pub source_total: usize,
    pub copy: Vec<PathBuf>,
    pub replace: Vec<PathBuf>,
    pub delete: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
}

impl BackupPlan {
    /// Compare two listings.
    ///
    /// A file present on both sides is unchanged when the sizes match and
    /// the modification times are no more than `tolerance` apart.
    pub fn build(source: &[FileEntry], target: &[FileEntry], tolerance: Duration) -> Self {
        let targets: BTreeMap<&Path, &FileEntry> =
            target.iter().map(|e| (e.relative.as_path(), e)).collect();

        let mut plan = Self {
            source_total: source.len(),
            ..Self::default()
        };
        for entry in source {
            match targets.get(entry.relative.as_path()) {
                None => plan.copy.push(entry.relative.clone()),
                Some(existing)
                    if existing.size == entry.size
                        && same_time(existing.modified, entry.modified, tolerance) =>
                {
                    plan.unchanged.push(entry.relative.clone());
                },
                Some(_) => plan.replace.push(entry.relative.clone()),
            }
        }

        let sources: BTreeSet<&Path> = source.iter().map(|e| e.relative.as_path()).collect();
        plan.delete = target
            .iter()
            .filter(|e| !sources.contains(e.relative.as_path()))
            .map(|e| e.relative.clone())
            .collect();

        for bucket in [&mut plan.copy, &mut plan.replace, &mut plan.delete, &mut plan.unchanged] {
            bucket.sort();
        }
        plan
    }

    pub fn paths(&self, action: Action) -> &[PathBuf] {
        match action {
            Action::Copy => &self.copy,
            Action::Replace => &self.replace,
            Action::Delete => &self.delete,
        }
    }

    /// Nothing to copy, replace or delete.
    pub fn is_noop(&self) -> bool {
        Action::ALL.iter().all(|a| self.paths(*a).is_empty())
    }

    /// Plain-text summary: the source total, then one line per non-empty
    /// bucket.
    pub fn summary(&self) -> String {
        let mut lines = vec![format!("{} source files", self.source_total)];
        for action in Action::ALL {
            let n = self.paths(action).len();
            if n > 0 {
                lines.push(format!("{:<10} {n}", action.gerund()));
            }
        }
        if !self.unchanged.is_empty() {
            lines.push(format!("{:<10} {}", "UNCHANGED", self.unchanged.len()));
        }
        lines.join("\n")
    }
}

fn same_time(a: SystemTime, b: SystemTime, tolerance: Duration) -> bool {
    let diff = a.duration_since(b).unwrap_or_else(|e| e.duration());
    diff <= tolerance
}
