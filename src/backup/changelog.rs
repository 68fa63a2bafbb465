//! Append-only CSV log of every file a backup touched.

use std::{
    fs::{File, OpenOptions},
    path::{Path, PathBuf},
};

use csv::{QuoteStyle, Writer, WriterBuilder};

use super::plan::Action;
use crate::{
    dates::systime,
    error::{IoContext, Result},
};

const HEADER: [&str; 5] = ["date_logged", "action", "source_dir", "dest_dir", "fname"];

/// Open log file plus the two roots recorded on every row.
pub struct ChangeLog {
    path: PathBuf,
    writer: Writer<File>,
    source_dir: String,
    dest_dir: String,
}

impl ChangeLog {
    /// Open `path` for appending, creating it (and writing the header) when
    /// it is new or empty.
    pub fn open(path: &Path, source_dir: &Path, dest_dir: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).at(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .at(path)?;
        let fresh = file.metadata().at(path)?.len() == 0;

        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .from_writer(file);
        if fresh {
            writer.write_record(HEADER)?;
            writer.flush().at(path)?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            writer,
            source_dir: source_dir.display().to_string(),
            dest_dir: dest_dir.display().to_string(),
        })
    }

    /// Append one row and flush, so an interrupted run still leaves a
    /// complete log of what was done.
    pub fn record(&mut self, action: Action, fname: &Path) -> Result<()> {
        let code = action.code().to_string();
        let fname = fname.display().to_string();
        self.writer.write_record([
            systime(false).as_str(),
            code.as_str(),
            self.source_dir.as_str(),
            self.dest_dir.as_str(),
            fname.as_str(),
        ])?;
        self.writer.flush().at(&self.path)?;
        Ok(())
    }
}

/// The path recorded for an action: the source file for copy and replace,
/// the target file for delete.
pub fn logged_path(action: Action, source: &Path, target: &Path, rel: &Path) -> PathBuf {
    match action {
        Action::Copy | Action::Replace => source.join(rel),
        Action::Delete => target.join(rel),
    }
}
