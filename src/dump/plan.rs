//! Which files on a card get dumped, and where they end up.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use tracing::{debug, trace};

use super::media::{MediaRules, Subcollection, is_thumbnail};
use crate::{
    dates::local_date,
    error::{IoContext, Result, ToolkitError},
    fsutil::{ListOptions, list_dirs, list_files, unique_path},
};

/// Media files selected from a card for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpPlan {
    pub date: NaiveDate,
    pub volume: PathBuf,
    pub collection: PathBuf,
    /// Full paths on the card, sorted.
    pub files: Vec<PathBuf>,
}

impl DumpPlan {
    /// Where each selected file would land.
    ///
    /// Basename collisions are numbered in file order, the same way staging
    /// renames them.
    pub fn destinations(&self, rules: &MediaRules) -> Vec<(PathBuf, PathBuf)> {
        let mut staged: HashSet<PathBuf> = HashSet::new();
        self.files
            .iter()
            .filter_map(|src| {
                let name = unique_path(Path::new(src.file_name()?), |p| staged.contains(p));
                staged.insert(name.clone());
                let sub = rules.classify(&name)?;
                Some((src.clone(), route_target(&self.collection, sub, &name)))
            })
            .collect()
    }
}

/// `<collection>/<subcollection>/<name>`.
pub fn route_target(collection: &Path, sub: Subcollection, name: &Path) -> PathBuf {
    collection.join(sub.dir_name()).join(name)
}

/// Turn `--volume` into a directory.
///
/// An existing directory is used as given; anything else is treated as a
/// volume name under `volumes_root`. When that does not exist either, the
/// error lists what is mounted.
pub fn resolve_volume(volume: &str, volumes_root: &Path) -> Result<PathBuf> {
    let direct = PathBuf::from(volume);
    if direct.is_dir() && (direct.is_absolute() || volume.contains('/')) {
        return Ok(direct);
    }
    let under_root = volumes_root.join(volume);
    if under_root.is_dir() {
        return Ok(under_root);
    }

    let available = if volumes_root.is_dir() {
        list_dirs(volumes_root, false, None, false)?
            .iter()
            .map(|p| p.display().to_string())
            .collect()
    } else {
        Vec::new()
    };
    debug!(%volume, root = %volumes_root.display(), ?available, "volume not found");
    Err(ToolkitError::VolumeNotFound {
        volume: volume.to_string(),
        root: volumes_root.to_path_buf(),
        available,
    })
}

/// Media files under `volume` last modified on `date`.
///
/// Hidden files and directories and camera thumbnails are skipped.
pub fn select_media(volume: &Path, date: NaiveDate, rules: &MediaRules) -> Result<Vec<PathBuf>> {
    let opts = ListOptions::default()
        .recursive()
        .extensions(rules.all_extensions())
        .full_names();

    let mut selected = Vec::new();
    for path in list_files(volume, &opts)? {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        if is_thumbnail(&name) {
            trace!(path = %path.display(), "thumbnail skipped");
            continue;
        }
        let modified = path.metadata().at(&path)?.modified().at(&path)?;
        if local_date(modified) == date {
            selected.push(path);
        }
    }

    if selected.is_empty() {
        return Err(ToolkitError::NoMedia {
            volume: volume.to_path_buf(),
            date,
        });
    }
    Ok(selected)
}

/// Resolve, validate and scan: everything a dump needs before it writes.
pub fn build(
    volume: &str,
    volumes_root: &Path,
    collection: &Path,
    date: NaiveDate,
    rules: &MediaRules,
) -> Result<DumpPlan> {
    let volume = resolve_volume(volume, volumes_root)?;
    crate::fsutil::ensure_dirs(&[collection])?;
    let files = select_media(&volume, date, rules)?;
    Ok(DumpPlan {
        date,
        volume,
        collection: collection.to_path_buf(),
        files,
    })
}
