//! Configuration types and loading logic.
//!
//! `Config` is a direct mapping of `mediakit.toml`. Every field has a
//! default so the file is entirely optional; running without one falls back
//! to the defaults below.
//!
//! Two files are read and merged per field: the global
//! `<config_dir>/mediakit/config.toml` first, then the local `--config`
//! path (default `./mediakit.toml`). Local values win.
//!
//! # File format
//!
//! ```toml
//! [dump]
//! volumes_root     = "/Volumes"
//! photo_extensions = ["jpg", "dng", "arw", "cr2"]
//! video_extensions = ["mov", "mp4", "mts", "m4v", "avi"]
//! staging_dir      = ".tmp.dumpsd"
//! date             = "today"
//!
//! [backup]
//! prompt               = false
//! include_hidden       = false
//! mtime_tolerance_secs = 0
//! log_file             = "~/backup-log.csv"
//! trash_dir            = "~/.Trash/mediakit"
//! permanent_delete     = false
//! ledger_file          = "Last-Update.yaml"
//! ledger_sections      = ["books", "movies", "music", "photos"]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use console::style;
use serde::{Deserialize, Serialize};

use crate::fsutil::expand_tilde;

// ─── Top-level ────────────────────────────────────────────────────────────────

/// Root configuration object, deserialised from `mediakit.toml`.
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct Config {
    /// SD-card dump settings.
    #[serde(default)]
    pub dump: DumpConfig,

    /// Three-way backup settings.
    #[serde(default)]
    pub backup: BackupConfig,
}

// ─── [dump] ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DumpConfig {
    /// Directory under which removable volumes are mounted. A bare
    /// `--volume NAME` is resolved against it.
    #[serde(default = "default_volumes_root")]
    pub volumes_root: PathBuf,

    /// Photo extensions, case-insensitive, without the dot.
    #[serde(default = "default_photo_extensions")]
    pub photo_extensions: Vec<String>,

    /// Video extensions, case-insensitive, without the dot.
    #[serde(default = "default_video_extensions")]
    pub video_extensions: Vec<String>,

    /// Name of the scratch directory created inside the collection while
    /// files are being dumped. Removed at the end of every run.
    #[serde(default = "default_staging_dir")]
    pub staging_dir: String,

    /// Default for `--date`: `today`, `yesterday` or `YYYY-MM-DD`.
    #[serde(default = "default_dump_date")]
    pub date: String,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            volumes_root: default_volumes_root(),
            photo_extensions: default_photo_extensions(),
            video_extensions: default_video_extensions(),
            staging_dir: default_staging_dir(),
            date: default_dump_date(),
        }
    }
}

// ─── [backup] ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BackupConfig {
    /// Ask for confirmation before touching the target.
    #[serde(default)]
    pub prompt: bool,

    /// Include dotfiles and dot-directories in the comparison.
    #[serde(default)]
    pub include_hidden: bool,

    /// Modification times closer than this are treated as equal. `0` means
    /// exact comparison; raise it for targets on FAT/exFAT (2 s resolution).
    #[serde(default)]
    pub mtime_tolerance_secs: u64,

    /// Append a CSV row here for every copy, replace and delete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,

    /// Move deleted target files here instead of the system trash.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trash_dir: Option<PathBuf>,

    /// Remove deleted target files outright. Ignored when `trash_dir` is
    /// set.
    #[serde(default)]
    pub permanent_delete: bool,

    /// "Last update" ledger, resolved against the target directory's parent
    /// when relative.
    #[serde(default = "default_ledger_file")]
    pub ledger_file: PathBuf,

    /// Target directory names that get a ledger entry.
    #[serde(default = "default_ledger_sections")]
    pub ledger_sections: Vec<String>,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            prompt: false,
            include_hidden: false,
            mtime_tolerance_secs: 0,
            log_file: None,
            trash_dir: None,
            permanent_delete: false,
            ledger_file: default_ledger_file(),
            ledger_sections: default_ledger_sections(),
        }
    }
}

// ─── Defaults ─────────────────────────────────────────────────────────────────

// Free functions for `#[serde(default = "…")]`; serde cannot call
// `Default::default()` for individual fields.

pub fn default_volumes_root() -> PathBuf {
    if cfg!(target_os = "macos") {
        PathBuf::from("/Volumes")
    } else {
        PathBuf::from("/media")
    }
}

pub fn default_photo_extensions() -> Vec<String> {
    ["jpg", "dng", "arw", "cr2"].map(String::from).to_vec()
}

pub fn default_video_extensions() -> Vec<String> {
    ["mov", "mp4", "mts", "m4v", "avi"].map(String::from).to_vec()
}

pub fn default_staging_dir() -> String {
    ".tmp.dumpsd".into()
}

pub fn default_dump_date() -> String {
    "today".into()
}

pub fn default_ledger_file() -> PathBuf {
    PathBuf::from("Last-Update.yaml")
}

pub fn default_ledger_sections() -> Vec<String> {
    ["books", "movies", "music", "photos"].map(String::from).to_vec()
}

// ─── Partial config (for merging) ─────────────────────────────────────────────

/// Every field optional, so a file that sets one key does not reset the
/// others when merged.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct PartialConfig {
    #[serde(default)]
    pub dump: PartialDumpConfig,
    #[serde(default)]
    pub backup: PartialBackupConfig,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct PartialDumpConfig {
    pub volumes_root: Option<PathBuf>,
    pub photo_extensions: Option<Vec<String>>,
    pub video_extensions: Option<Vec<String>>,
    pub staging_dir: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct PartialBackupConfig {
    pub prompt: Option<bool>,
    pub include_hidden: Option<bool>,
    pub mtime_tolerance_secs: Option<u64>,
    pub log_file: Option<PathBuf>,
    pub trash_dir: Option<PathBuf>,
    pub permanent_delete: Option<bool>,
    pub ledger_file: Option<PathBuf>,
    pub ledger_sections: Option<Vec<String>>,
}

impl PartialConfig {
    /// Overlay `other` on top of `self`; fields set in `other` win.
    pub fn merge(self, other: Self) -> Self {
        let (a, b) = (self.dump, other.dump);
        let dump = PartialDumpConfig {
            volumes_root: b.volumes_root.or(a.volumes_root),
            photo_extensions: b.photo_extensions.or(a.photo_extensions),
            video_extensions: b.video_extensions.or(a.video_extensions),
            staging_dir: b.staging_dir.or(a.staging_dir),
            date: b.date.or(a.date),
        };
        let (a, b) = (self.backup, other.backup);
        let backup = PartialBackupConfig {
            prompt: b.prompt.or(a.prompt),
            include_hidden: b.include_hidden.or(a.include_hidden),
            mtime_tolerance_secs: b.mtime_tolerance_secs.or(a.mtime_tolerance_secs),
            log_file: b.log_file.or(a.log_file),
            trash_dir: b.trash_dir.or(a.trash_dir),
            permanent_delete: b.permanent_delete.or(a.permanent_delete),
            ledger_file: b.ledger_file.or(a.ledger_file),
            ledger_sections: b.ledger_sections.or(a.ledger_sections),
        };
        Self { dump, backup }
    }

    /// Fill the gaps with defaults and expand `~` in path fields.
    pub fn resolve(self) -> Config {
        let d = self.dump;
        let dump = DumpConfig {
            volumes_root: expand_tilde(&d.volumes_root.unwrap_or_else(default_volumes_root)),
            photo_extensions: d.photo_extensions.unwrap_or_else(default_photo_extensions),
            video_extensions: d.video_extensions.unwrap_or_else(default_video_extensions),
            staging_dir: d.staging_dir.unwrap_or_else(default_staging_dir),
            date: d.date.unwrap_or_else(default_dump_date),
        };
        let b = self.backup;
        let backup = BackupConfig {
            prompt: b.prompt.unwrap_or(false),
            include_hidden: b.include_hidden.unwrap_or(false),
            mtime_tolerance_secs: b.mtime_tolerance_secs.unwrap_or(0),
            log_file: b.log_file.as_deref().map(expand_tilde),
            trash_dir: b.trash_dir.as_deref().map(expand_tilde),
            permanent_delete: b.permanent_delete.unwrap_or(false),
            ledger_file: expand_tilde(&b.ledger_file.unwrap_or_else(default_ledger_file)),
            ledger_sections: b.ledger_sections.unwrap_or_else(default_ledger_sections),
        };
        Config { dump, backup }
    }
}

// ─── Loader ───────────────────────────────────────────────────────────────────

/// Parse `path` as a partial config. A missing file is `Ok(None)`; a file
/// that exists but cannot be read or parsed is an error.
pub fn parse_partial(path: &Path) -> Result<Option<PartialConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let partial = toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(partial))
}

/// Load the global file (if any) and the local file, and merge them.
///
/// A broken global file is an error just like a broken local one. A missing
/// local file prints a warning and falls back to the global values.
pub fn load_merged(global_path: Option<&Path>, local_path: &Path) -> Result<Config> {
    let global = match global_path {
        Some(p) => parse_partial(p)?.unwrap_or_default(),
        None => PartialConfig::default(),
    };

    let local = if let Some(p) = parse_partial(local_path)? {
        p
    } else {
        eprintln!(
            "{} config file '{}' not found, using defaults.\n\
             Run 'mediakit init' to generate a starter config.",
            style("Warning:").yellow().bold(),
            local_path.display()
        );
        PartialConfig::default()
    };

    Ok(global.merge(local).resolve())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
