//! Error type shared by the helper library and both tools.
//!
//! Library code returns [`Result`]; the command handlers wrap these errors in
//! `anyhow` with extra context before they reach `main`.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

/// Main error type for the toolkit.
#[derive(Error, Debug)]
pub enum ToolkitError {
    /// An I/O operation failed on a specific path.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The platform trash refused a file.
    #[error("moving {} to the trash: {source}", .path.display())]
    Trash {
        path: PathBuf,
        #[source]
        source: trash::Error,
    },

    /// Directory traversal failed part-way through.
    #[error("walking directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("'{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// One or more required directories are missing.
    #[error("directories do not exist: {}", join_paths(.0))]
    MissingDirectories(Vec<PathBuf>),

    #[error("source and target are the same directory: '{}'", .0.display())]
    SameDirectory(PathBuf),

    #[error("'{}' is inside '{}'; source and target must not contain each other", .inner.display(), .outer.display())]
    NestedDirectories { inner: PathBuf, outer: PathBuf },

    #[error("invalid date '{0}': expected 'today', 'yesterday' or YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// `--volume` matched neither a directory nor a mounted volume.
    #[error("volume '{volume}' not found under '{}'{}", .root.display(), available_hint(.available))]
    VolumeNotFound {
        volume: String,
        root: PathBuf,
        available: Vec<String>,
    },

    #[error("No photo or video files found at '{}' for day '{date}'!", .volume.display())]
    NoMedia { volume: PathBuf, date: NaiveDate },

    /// The user declined a confirmation prompt.
    #[error("{0}")]
    Aborted(String),

    /// An external command could not run or exited non-zero.
    #[error("command failed: {0}")]
    Command(String),

    #[error("change log: {0}")]
    Csv(#[from] csv::Error),
}

/// Result alias used across the library modules.
pub type Result<T> = std::result::Result<T, ToolkitError>;

impl ToolkitError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Attach the offending path to a bare `io::Result`.
pub trait IoContext<T> {
    fn at(self, path: &Path) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn at(self, path: &Path) -> Result<T> {
        self.map_err(|e| ToolkitError::io(path, e))
    }
}

fn available_hint(available: &[String]) -> String {
    if available.is_empty() {
        String::new()
    } else {
        format!(" (available: {})", available.join(", "))
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("'{}'", p.display()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_the_path() {
        let err = std::fs::read("/definitely/not/here.txt")
            .at(Path::new("/definitely/not/here.txt"))
            .unwrap_err();
        assert!(err.to_string().starts_with("/definitely/not/here.txt: "));
    }

    #[test]
    fn missing_directories_lists_every_path() {
        let err = ToolkitError::MissingDirectories(vec!["/a".into(), "/b c".into()]);
        assert_eq!(err.to_string(), "directories do not exist: '/a', '/b c'");
    }

    #[test]
    fn no_media_matches_console_wording() {
        let err = ToolkitError::NoMedia {
            volume: "/Volumes/A7R2".into(),
            date: NaiveDate::from_ymd_opt(2019, 9, 30).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "No photo or video files found at '/Volumes/A7R2' for day '2019-09-30'!"
        );
    }
}
