//! `mediakit init`: scaffold a commented `mediakit.toml`.

use std::{fs, path::Path};

use anyhow::{Context, Result, bail};
use console::style;

use crate::config::default_volumes_root;

/// Render the starter config. Every value is the built-in default, so the
/// generated file changes nothing until edited.
pub fn template() -> String {
    format!(
        r#"# mediakit configuration.
#
# Every key is optional. Values here override the global file at
# <config dir>/mediakit/config.toml; command-line flags override both.

[dump]
# Where removable volumes are mounted. `--volume NAME` is looked up here;
# `--volume /path/to/card` is used as-is.
volumes_root = "{volumes_root}"

# Extensions picked up from the card (case-insensitive, no dot).
photo_extensions = ["jpg", "dng", "arw", "cr2"]
video_extensions = ["mov", "mp4", "mts", "m4v", "avi"]

# Scratch directory created inside the collection while dumping.
staging_dir = ".tmp.dumpsd"

# Default for --date: "today", "yesterday" or "YYYY-MM-DD".
date = "today"

[backup]
# Ask before changing anything (override per run with --yes).
prompt = false

# Include dotfiles and dot-directories.
include_hidden = false

# Treat modification times this many seconds apart as equal.
# Use 2 for FAT/exFAT targets.
mtime_tolerance_secs = 0

# Append a CSV row for every copy, replace and delete.
# log_file = "~/backup-log.csv"

# Deleted files go to the system trash, or here when set.
# trash_dir = "~/.Trash/mediakit"

# Remove deleted files outright instead (not recoverable).
permanent_delete = false

# "Last update" ledger next to the target directory, and the target
# directory names that get an entry.
ledger_file = "Last-Update.yaml"
ledger_sections = ["books", "movies", "music", "photos"]
"#,
        volumes_root = default_volumes_root().display()
    )
}

/// Write the template to `path`, refusing to overwrite.
pub fn run(path: &Path) -> Result<()> {
    if path.exists() {
        bail!(
            "{} already exists, refusing to overwrite it",
            path.display()
        );
    }
    fs::write(path, template()).with_context(|| format!("writing {}", path.display()))?;
    println!(
        "  {}  Created {}",
        style("✓").green().bold(),
        style(path.display()).bold()
    );
    Ok(())
}
