//! Command-line interface definition.
//!
//! All argument parsing lives here so the rest of the codebase can stay
//! agnostic to `clap`.  The `Cli` struct is parsed once in `main` and then
//! passed (by reference) into the command handlers.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser};

/// Top-level CLI arguments, shared across every subcommand.
#[derive(Parser, Debug)]
#[command(
    name    = "mediakit",
    about   = "Dump SD cards and mirror directories, driven by mediakit.toml",
    version,
    arg_required_else_help = true,
    // Show a compact two-column help layout.
    help_template = "\
{before-help}{name} {version}
{about}

{usage-heading} {usage}

{all-args}{after-help}"
)]
pub struct Cli {
    /// Path to the configuration file.
    ///
    /// Defaults to `mediakit.toml` in the current working directory.  Values
    /// here override the global `<config dir>/mediakit/config.toml`.
    #[arg(short, long, global = true, default_value = "mediakit.toml")]
    pub config: PathBuf,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Subcommand>,

    /// Print the merged configuration as TOML and exit.
    #[arg(long)]
    pub print_config: bool,

    /// More log output on stderr (`-v` debug, `-vv` trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(clap::Subcommand, Debug, PartialEq, Eq)]
pub enum Subcommand {
    /// Scaffold a `mediakit.toml` at the `--config` path.
    ///
    /// Exits with an error if the file already exists to avoid accidental
    /// overwrites.
    Init,

    /// Copy one day's photos and videos off a memory card into a collection.
    ///
    /// Files are staged first, then routed into `Photo`, `Video`, `Gopro`
    /// or `Drone` subdirectories of the collection based on their names.
    Dump(DumpArgs),

    /// Mirror a source directory onto a target directory.
    ///
    /// New files are copied, changed files replaced and files missing from
    /// the source deleted from the target.
    Backup(BackupArgs),
}

#[derive(Args, Debug, PartialEq, Eq, Clone)]
pub struct DumpArgs {
    /// Volume name under `[dump].volumes_root`, or a path to the card.
    #[arg(long)]
    pub volume: String,

    /// Destination collection directory.
    #[arg(long)]
    pub collection: PathBuf,

    /// Day to dump: `today`, `yesterday` or `YYYY-MM-DD`.
    ///
    /// Defaults to `[dump].date`.
    #[arg(long)]
    pub date: Option<String>,

    /// Show what would be copied and where, without writing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Send a desktop notification when done.
    #[arg(long)]
    pub notify: bool,
}

#[derive(Args, Debug, PartialEq, Eq, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct BackupArgs {
    /// Directory to back up.
    #[arg(long)]
    pub source: PathBuf,

    /// Directory to bring in line with the source.
    #[arg(long)]
    pub target: PathBuf,

    /// Ask before changing anything.
    #[arg(long)]
    pub prompt: bool,

    /// Never ask, even when `[backup].prompt` is set.
    #[arg(short, long, conflicts_with = "prompt")]
    pub yes: bool,

    /// Do not copy files that are new in the source.
    #[arg(long)]
    pub skip_copy: bool,

    /// Do not overwrite files that changed.
    #[arg(long)]
    pub skip_replace: bool,

    /// Do not delete files that are gone from the source.
    #[arg(long)]
    pub skip_delete: bool,

    /// Append a CSV row per action to this file.
    ///
    /// Defaults to `[backup].log_file`.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Print the plan and stop.
    #[arg(long)]
    pub dry_run: bool,

    /// Send a desktop notification when done.
    #[arg(long)]
    pub notify: bool,
}
