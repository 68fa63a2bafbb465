//! `mediakit`: SD-card dumps and directory backups, plus the file helpers
//! they share.
//!
//! # Module layout
//!
//! | Module                   | Responsibility                                  |
//! |--------------------------|-------------------------------------------------|
//! | [`cli`]                  | Argument types parsed by clap                   |
//! | [`config`]               | `Config` struct, TOML loader, global/local merge |
//! | [`logging`]              | `tracing` subscriber setup                      |
//! | [`ui`]                   | Spinners, progress bars, stage output, prompts  |
//! | [`error`]                | `ToolkitError` and the library `Result`         |
//! | [`fsutil`]               | Listing, scanning, copying, moving              |
//! | [`shell`]                | Captured commands, PATH lookup, notifications   |
//! | [`dates`] / [`format`]   | Date keywords, timestamps, human sizes          |
//! | [`dump`]                 | SD dump planning, staging and routing           |
//! | [`backup`]               | Three-way diff, execution, change log, ledger   |
//! | [`commands`]             | One handler per subcommand                      |

pub mod backup;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dates;
pub mod dump;
pub mod error;
pub mod format;
pub mod fsutil;
pub mod logging;
pub mod shell;
pub mod ui;
