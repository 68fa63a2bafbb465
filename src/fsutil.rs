//! Filesystem helpers shared by the dump and backup tools.
//!
//! Everything here is synchronous and works on plain paths. Listings are
//! always returned sorted so callers (and tests) see a stable order
//! regardless of what the underlying filesystem hands back.

use std::{
    fs::{self, OpenOptions},
    io::ErrorKind,
    path::{Component, Path, PathBuf},
    time::SystemTime,
};

use regex::{Regex, RegexBuilder};
use tracing::trace;
use walkdir::{DirEntry, WalkDir};

use crate::error::{IoContext, Result, ToolkitError};

// ─── Listing ──────────────────────────────────────────────────────────────────

/// Filters for [`list_files`].
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Keep only paths (relative to the root) matching this regex.
    pub pattern: Option<Regex>,
    /// Keep only these extensions, lowercased and without the leading dot.
    /// Empty means no extension filter.
    pub extensions: Vec<String>,
    /// Keep dotfiles and descend into dot-directories.
    pub include_hidden: bool,
    /// Return `root.join(relative)` instead of the relative path.
    pub full_names: bool,
}

impl ListOptions {
    pub fn recursive(mut self) -> Self {
        self.recursive = true;
        self
    }

    /// Case-insensitive regex filter on the relative path.
    pub fn pattern(mut self, pattern: &str) -> Result<Self> {
        self.pattern = Some(RegexBuilder::new(pattern).case_insensitive(true).build()?);
        Ok(self)
    }

    pub fn extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = normalize_extensions(exts);
        self
    }

    pub const fn include_hidden(mut self, yes: bool) -> Self {
        self.include_hidden = yes;
        self
    }

    pub fn full_names(mut self) -> Self {
        self.full_names = true;
        self
    }
}

/// Lowercase extensions and strip any leading dot, so `".JPG"` and `"jpg"`
/// compare equal.
pub fn normalize_extensions<I, S>(exts: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    exts.into_iter()
        .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Whether `path` has one of `exts` (already normalized).
pub fn has_extension(path: &Path, exts: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| exts.iter().any(|x| x.eq_ignore_ascii_case(e)))
}

/// Dotfile or dot-directory.
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

fn walker(
    root: &Path,
    recursive: bool,
    include_hidden: bool,
) -> impl Iterator<Item = walkdir::Result<DirEntry>> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |e| e.depth() == 0 || include_hidden || !is_hidden(e.path()))
}

fn require_dir(root: &Path) -> Result<()> {
    if root.is_dir() {
        Ok(())
    } else {
        Err(ToolkitError::NotADirectory(root.to_path_buf()))
    }
}

/// List regular files under `root`.
///
/// Symlinks are not followed. Paths are relative to `root` unless
/// [`ListOptions::full_names`] is set.
pub fn list_files(root: &Path, opts: &ListOptions) -> Result<Vec<PathBuf>> {
    require_dir(root)?;

    let mut files = Vec::new();
    for entry in walker(root, opts.recursive, opts.include_hidden) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = relative_to(root, entry.path());
        if !opts.extensions.is_empty() && !has_extension(&relative, &opts.extensions) {
            continue;
        }
        if let Some(re) = &opts.pattern {
            if !re.is_match(&relative.to_string_lossy()) {
                continue;
            }
        }
        files.push(if opts.full_names {
            entry.into_path()
        } else {
            relative
        });
    }
    files.sort();
    trace!(root = %root.display(), count = files.len(), "listed files");
    Ok(files)
}

/// List subdirectories under `root`, optionally filtered by an anchored
/// regex on the relative path.
pub fn list_dirs(
    root: &Path,
    recursive: bool,
    pattern: Option<&str>,
    full_names: bool,
) -> Result<Vec<PathBuf>> {
    require_dir(root)?;
    let re = pattern
        .map(|p| Regex::new(&format!("^(?:{p})")))
        .transpose()?;

    let mut dirs = Vec::new();
    for entry in walker(root, recursive, true) {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let relative = relative_to(root, entry.path());
        if re
            .as_ref()
            .is_some_and(|re| !re.is_match(&relative.to_string_lossy()))
        {
            continue;
        }
        dirs.push(if full_names {
            entry.into_path()
        } else {
            relative
        });
    }
    dirs.sort();
    Ok(dirs)
}

fn relative_to(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}

// ─── Scanning ─────────────────────────────────────────────────────────────────

/// One regular file found by [`scan_tree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path relative to the scanned root.
    pub relative: PathBuf,
    pub size: u64,
    pub modified: SystemTime,
}

/// Recursively collect every regular file under `root` with its size and
/// modification time, sorted by relative path.
pub fn scan_tree(root: &Path, include_hidden: bool) -> Result<Vec<FileEntry>> {
    require_dir(root)?;

    let mut entries = Vec::new();
    for entry in walker(root, true, include_hidden) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let meta = entry.metadata()?;
        entries.push(FileEntry {
            relative: relative_to(root, entry.path()),
            size: meta.len(),
            modified: meta.modified().at(entry.path())?,
        });
    }
    entries.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(entries)
}

/// Total size in bytes of all regular files under `root`. Symlinks are
/// skipped, hidden files are counted.
pub fn dir_size(root: &Path) -> Result<u64> {
    require_dir(root)?;
    let mut total = 0;
    for entry in walker(root, true, true) {
        let entry = entry?;
        if entry.file_type().is_file() {
            total += entry.metadata()?.len();
        }
    }
    Ok(total)
}

// ─── Copying and moving ───────────────────────────────────────────────────────

/// Copy `src` to `dst` (overwriting) and stamp `src`'s modification time on
/// the copy. Returns the number of bytes copied.
pub fn copy_preserving_mtime(src: &Path, dst: &Path) -> Result<u64> {
    let modified = fs::metadata(src).at(src)?.modified().at(src)?;
    let bytes = fs::copy(src, dst).at(dst)?;
    OpenOptions::new()
        .write(true)
        .open(dst)
        .at(dst)?
        .set_modified(modified)
        .at(dst)?;
    Ok(bytes)
}

/// Move a file, falling back to copy + remove when `src` and `dst` are on
/// different filesystems.
pub fn move_file(src: &Path, dst: &Path) -> Result<()> {
    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::CrossesDevices => {
            copy_preserving_mtime(src, dst)?;
            fs::remove_file(src).at(src)
        },
        Err(e) => Err(ToolkitError::io(src, e)),
    }
}

/// Split a file name into stem and extension the way a shell user expects:
/// leading dots are part of the stem, and a trailing `.icloud` placeholder
/// suffix travels with the real extension.
fn split_name(name: &str) -> (&str, &str) {
    fn split_once(name: &str) -> (&str, &str) {
        match name.rfind('.') {
            Some(i) if !name[..i].chars().all(|c| c == '.') => (&name[..i], &name[i..]),
            _ => (name, ""),
        }
    }

    let (stem, ext) = split_once(name);
    if ext == ".icloud" {
        let (inner_stem, inner_ext) = split_once(stem);
        (inner_stem, &name[inner_stem.len()..][..inner_ext.len() + ext.len()])
    } else {
        (stem, ext)
    }
}

/// Insert `suffix` between a file's stem and its extension.
///
/// `IMG_0001.jpg` + `-1` → `IMG_0001-1.jpg`;
/// `.IMG_0001.jpg.icloud` + `-1` → `.IMG_0001-1.jpg.icloud`.
pub fn append_filename_suffix(path: &Path, suffix: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (stem, ext) = split_name(&name);
    path.with_file_name(format!("{stem}{suffix}{ext}"))
}

/// First of `path`, `path-1`, `path-2`, … that does not exist yet.
pub fn unique_destination(path: &Path) -> PathBuf {
    unique_path(path, Path::exists)
}

/// First of `path`, `path-1`, `path-2`, … for which `taken` is false.
pub fn unique_path(path: &Path, taken: impl Fn(&Path) -> bool) -> PathBuf {
    if !taken(path) {
        return path.to_path_buf();
    }
    (1..)
        .map(|n| append_filename_suffix(path, &format!("-{n}")))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| path.to_path_buf())
}

// ─── Misc ─────────────────────────────────────────────────────────────────────

/// Error listing every path in `paths` that is not an existing directory.
pub fn ensure_dirs<P: AsRef<Path>>(paths: &[P]) -> Result<()> {
    let missing: Vec<PathBuf> = paths
        .iter()
        .map(AsRef::as_ref)
        .filter(|p| !p.is_dir())
        .map(Path::to_path_buf)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ToolkitError::MissingDirectories(missing))
    }
}

/// Expand a leading `~` to the current user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => match dirs::home_dir() {
            Some(home) => home.join(components.as_path()),
            None => path.to_path_buf(),
        },
        _ => path.to_path_buf(),
    }
}

/// Sort strings so that runs of digits compare by value: `img2` before
/// `img10`. Ties fall back to plain string order.
pub fn natural_sort<S: AsRef<str>>(items: &mut [S]) {
    items.sort_by(|a, b| {
        natural_key(a.as_ref())
            .cmp(&natural_key(b.as_ref()))
            .then_with(|| a.as_ref().cmp(b.as_ref()))
    });
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Chunk {
    Number(u128),
    Text(String),
}

fn natural_key(s: &str) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut rest = s;
    while let Some(first) = rest.chars().next() {
        let digits = first.is_ascii_digit();
        let end = rest
            .find(|c: char| c.is_ascii_digit() != digits)
            .unwrap_or(rest.len());
        let (run, tail) = rest.split_at(end);
        chunks.push(match run.parse() {
            Ok(n) if digits => Chunk::Number(n),
            _ => Chunk::Text(run.to_lowercase()),
        });
        rest = tail;
    }
    chunks
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn touch(root: &Path, rel: &str, content: &str) -> PathBuf {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(&p, content).unwrap();
        p
    }

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.JPG", "a");
        touch(dir.path(), "b.mov", "bb");
        touch(dir.path(), ".hidden.jpg", "h");
        touch(dir.path(), "sub/c.jpg", "ccc");
        touch(dir.path(), "sub/notes.txt", "n");
        touch(dir.path(), ".cache/d.jpg", "d");
        dir
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths.iter().map(|p| p.to_string_lossy().into_owned()).collect()
    }

    // ── list_files ────────────────────────────────────────────────────────────

    #[test]
    fn flat_listing_skips_subdirectories_and_hidden() {
        let dir = tree();
        let files = list_files(dir.path(), &ListOptions::default()).unwrap();
        assert_eq!(names(&files), ["a.JPG", "b.mov"]);
    }

    #[test]
    fn recursive_listing_is_sorted_and_relative() {
        let dir = tree();
        let files = list_files(dir.path(), &ListOptions::default().recursive()).unwrap();
        assert_eq!(names(&files), [
            "a.JPG",
            "b.mov",
            "sub/c.jpg",
            "sub/notes.txt"
        ]);
    }

    #[test]
    fn hidden_files_and_dirs_can_be_included() {
        let dir = tree();
        let opts = ListOptions::default().recursive().include_hidden(true);
        let files = list_files(dir.path(), &opts).unwrap();
        assert!(files.contains(&PathBuf::from(".hidden.jpg")));
        assert!(files.contains(&PathBuf::from(".cache/d.jpg")));
    }

    #[test]
    fn extension_filter_ignores_case_and_dots() {
        let dir = tree();
        let opts = ListOptions::default().recursive().extensions([".jpg"]);
        let files = list_files(dir.path(), &opts).unwrap();
        assert_eq!(names(&files), ["a.JPG", "sub/c.jpg"]);
    }

    #[test]
    fn pattern_filter_is_case_insensitive() {
        let dir = tree();
        let opts = ListOptions::default().recursive().pattern("^SUB/").unwrap();
        let files = list_files(dir.path(), &opts).unwrap();
        assert_eq!(names(&files), ["sub/c.jpg", "sub/notes.txt"]);
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        assert!(matches!(
            ListOptions::default().pattern("(unclosed"),
            Err(ToolkitError::Pattern(_))
        ));
    }

    #[test]
    fn full_names_join_the_root() {
        let dir = tree();
        let files = list_files(dir.path(), &ListOptions::default().full_names()).unwrap();
        assert_eq!(files[0], dir.path().join("a.JPG"));
    }

    #[test]
    fn missing_root_is_reported() {
        let err = list_files(Path::new("/no/such/dir/xyz"), &ListOptions::default()).unwrap_err();
        assert!(matches!(err, ToolkitError::NotADirectory(_)));
    }

    // ── list_dirs ─────────────────────────────────────────────────────────────

    #[test]
    fn list_dirs_flat_and_filtered() {
        let dir = tree();
        touch(dir.path(), "2019/September/x.jpg", "x");
        assert_eq!(
            names(&list_dirs(dir.path(), false, None, false).unwrap()),
            [".cache", "2019", "sub"]
        );
        assert_eq!(
            names(&list_dirs(dir.path(), true, Some(r"\d{4}"), false).unwrap()),
            ["2019", "2019/September"]
        );
    }

    // ── scan_tree / dir_size ──────────────────────────────────────────────────

    #[test]
    fn scan_tree_records_size_and_mtime() {
        let dir = tree();
        let entries = scan_tree(dir.path(), false).unwrap();
        let c = entries
            .iter()
            .find(|e| e.relative == Path::new("sub/c.jpg"))
            .unwrap();
        assert_eq!(c.size, 3);
        assert_eq!(
            c.modified,
            fs::metadata(dir.path().join("sub/c.jpg"))
                .unwrap()
                .modified()
                .unwrap()
        );
        assert!(entries.iter().all(|e| !is_hidden(&e.relative)));
    }

    #[test]
    fn dir_size_counts_hidden_files() {
        let dir = tree();
        // a(1) + bb(2) + h(1) + ccc(3) + n(1) + d(1)
        assert_eq!(dir_size(dir.path()).unwrap(), 9);
    }

    #[cfg(unix)]
    #[test]
    fn dir_size_skips_symlinks() {
        let dir = tree();
        std::os::unix::fs::symlink(dir.path().join("sub/c.jpg"), dir.path().join("link.jpg"))
            .unwrap();
        assert_eq!(dir_size(dir.path()).unwrap(), 9);
    }

    // ── copy / move ───────────────────────────────────────────────────────────

    #[test]
    fn copy_preserves_modification_time() {
        let dir = tempfile::tempdir().unwrap();
        let src = touch(dir.path(), "src.jpg", "pixels");
        let old = SystemTime::now() - Duration::from_secs(86_400 * 30);
        OpenOptions::new()
            .write(true)
            .open(&src)
            .unwrap()
            .set_modified(old)
            .unwrap();

        let dst = dir.path().join("dst.jpg");
        assert_eq!(copy_preserving_mtime(&src, &dst).unwrap(), 6);
        assert_eq!(fs::read_to_string(&dst).unwrap(), "pixels");
        assert_eq!(fs::metadata(&dst).unwrap().modified().unwrap(), old);
    }

    #[test]
    fn copy_overwrites_existing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let src = touch(dir.path(), "src.txt", "new");
        let dst = touch(dir.path(), "dst.txt", "old contents");
        copy_preserving_mtime(&src, &dst).unwrap();
        assert_eq!(fs::read_to_string(&dst).unwrap(), "new");
    }

    #[test]
    fn move_file_renames() {
        let dir = tempfile::tempdir().unwrap();
        let src = touch(dir.path(), "a.txt", "a");
        let dst = dir.path().join("b.txt");
        move_file(&src, &dst).unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read_to_string(&dst).unwrap(), "a");
    }

    // ── names ─────────────────────────────────────────────────────────────────

    #[test]
    fn suffix_goes_before_extension() {
        assert_eq!(
            append_filename_suffix(Path::new("/x/IMG_0001.jpg"), "-1"),
            Path::new("/x/IMG_0001-1.jpg")
        );
        assert_eq!(
            append_filename_suffix(Path::new("archive.tar.gz"), "_v2"),
            Path::new("archive.tar_v2.gz")
        );
        assert_eq!(
            append_filename_suffix(Path::new("README"), "-1"),
            Path::new("README-1")
        );
        assert_eq!(
            append_filename_suffix(Path::new(".bashrc"), "-1"),
            Path::new(".bashrc-1")
        );
    }

    #[test]
    fn icloud_placeholder_keeps_real_extension() {
        assert_eq!(
            append_filename_suffix(Path::new(".IMG_0001.jpg.icloud"), "-1"),
            Path::new(".IMG_0001-1.jpg.icloud")
        );
    }

    #[test]
    fn unique_destination_counts_up() {
        let dir = tempfile::tempdir().unwrap();
        let wanted = dir.path().join("DSC001.jpg");
        assert_eq!(unique_destination(&wanted), wanted);

        touch(dir.path(), "DSC001.jpg", "");
        touch(dir.path(), "DSC001-1.jpg", "");
        assert_eq!(unique_destination(&wanted), dir.path().join("DSC001-2.jpg"));
    }

    #[test]
    fn unique_path_consults_the_predicate() {
        let taken = [PathBuf::from("DSC001.JPG"), PathBuf::from("DSC001-1.JPG")];
        let got = unique_path(Path::new("DSC001.JPG"), |p| taken.iter().any(|t| t == p));
        assert_eq!(got, PathBuf::from("DSC001-2.JPG"));
        assert_eq!(unique_path(Path::new("x.jpg"), |_| false), PathBuf::from("x.jpg"));
    }

    // ── misc ──────────────────────────────────────────────────────────────────

    #[test]
    fn ensure_dirs_reports_only_missing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        match ensure_dirs(&[dir.path().to_path_buf(), missing.clone()]) {
            Err(ToolkitError::MissingDirectories(m)) => assert_eq!(m, vec![missing]),
            other => panic!("expected MissingDirectories, got {other:?}"),
        }
        assert!(ensure_dirs(&[dir.path()]).is_ok());
    }

    #[test]
    fn tilde_expands_to_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(expand_tilde(Path::new("~/backup-log.csv")), home.join("backup-log.csv"));
        assert_eq!(expand_tilde(Path::new("/abs/~")), Path::new("/abs/~"));
    }

    #[test]
    fn extension_helpers() {
        let exts = normalize_extensions([".JPG", "mov", ""]);
        assert_eq!(exts, ["jpg", "mov"]);
        assert!(has_extension(Path::new("x/A.Jpg"), &exts));
        assert!(!has_extension(Path::new("x/A.png"), &exts));
        assert!(!has_extension(Path::new("x/jpg"), &exts));
    }

    #[test]
    fn natural_sort_orders_digit_runs_by_value() {
        let mut names = vec!["img10.jpg", "IMG2.jpg", "img1.jpg", "a", "img2.jpg"];
        natural_sort(&mut names);
        assert_eq!(names, ["a", "img1.jpg", "IMG2.jpg", "img2.jpg", "img10.jpg"]);
    }
}
