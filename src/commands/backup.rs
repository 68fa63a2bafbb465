//! `mediakit backup`: make a target directory mirror a source.
//!
//! # Stages (in order)
//!
//! | # | Stage   | Flag to skip     | Description                                |
//! |---|---------|------------------|--------------------------------------------|
//! | 1 | Scan    |                  | Validate roots, list both trees, plan      |
//! | 2 | Copy    | `--skip-copy`    | Files new in the source                    |
//! | 3 | Replace | `--skip-replace` | Files whose size or mtime changed          |
//! | 4 | Delete  | `--skip-delete`  | Files gone from the source                 |
//! | 5 | Ledger  |                  | Date entry in the "last update" ledger     |
//! | 6 | Notify  | (`--notify`)     | Desktop notification                       |
//!
//! Copy, replace and delete keep going past per-file failures; the run
//! exits non-zero after the summary if anything failed.

use std::{
    collections::BTreeMap,
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, Result, bail};
use tracing::info;

use super::file_outcome;
use crate::{
    backup::{
        self, Action, Backup, BackupPlan, Disposal,
        changelog::ChangeLog,
        ledger::{self, section_for},
    },
    cli::BackupArgs,
    config::BackupConfig,
    dates::today,
    error::ToolkitError,
    format::{fmt_elapsed, human_filesize},
    fsutil::expand_tilde,
    shell,
    ui::{self, StageOutcome, byte_bar, print_block, print_summary, run_stage, skipped_stage},
};

const TOOL: &str = "Back up";

/// Plan plus per-file sizes for progress bars.
struct Scanned {
    plan: BackupPlan,
    source_sizes: BTreeMap<PathBuf, u64>,
    target_sizes: BTreeMap<PathBuf, u64>,
}

impl Scanned {
    fn bytes(&self, action: Action) -> u64 {
        let sizes = match action {
            Action::Copy | Action::Replace => &self.source_sizes,
            Action::Delete => &self.target_sizes,
        };
        self.plan
            .paths(action)
            .iter()
            .filter_map(|p| sizes.get(p))
            .sum()
    }
}

/// Whether to ask before executing: `--yes` always wins, then `--prompt`,
/// then `[backup].prompt`.
pub const fn should_prompt(args: &BackupArgs, cfg: &BackupConfig) -> bool {
    !args.yes && (args.prompt || cfg.prompt)
}

const fn skipped_by_flag(args: &BackupArgs, action: Action) -> bool {
    match action {
        Action::Copy => args.skip_copy,
        Action::Replace => args.skip_replace,
        Action::Delete => args.skip_delete,
    }
}

/// Execute a backup.
pub fn run(args: &BackupArgs, cfg: &BackupConfig) -> Result<()> {
    let started = Instant::now();
    println!();

    let mut outcomes: Vec<StageOutcome> = Vec::new();

    // 1. Scan
    let mut scanned: Option<Scanned> = None;
    let scan = run_stage("Scan", || {
        backup::validate(&args.source, &args.target)?;
        let (source, target) = backup::scan(&args.source, &args.target, cfg.include_hidden)?;
        let plan = BackupPlan::build(
            &source,
            &target,
            Duration::from_secs(cfg.mtime_tolerance_secs),
        );
        let detail = format!("{} source files, {} target files", source.len(), target.len());
        scanned = Some(Scanned {
            plan,
            source_sizes: source.into_iter().map(|e| (e.relative, e.size)).collect(),
            target_sizes: target.into_iter().map(|e| (e.relative, e.size)).collect(),
        });
        Ok(detail)
    });
    scan.print();
    let scan_failed = scan.failed();
    outcomes.push(scan);

    let Some(scanned) = scanned.filter(|_| !scan_failed) else {
        print_summary(&outcomes, TOOL);
        bail!("back up aborted: scan failed");
    };

    println!();
    print_block(&scanned.plan.summary());
    println!();

    if args.dry_run {
        println!("  Dry run, nothing changed.");
        return Ok(());
    }

    // Confirmation
    if should_prompt(args, cfg) && !ui::confirm("Proceed with program execution?")? {
        return Err(ToolkitError::Aborted("Must answer affirmatively!".into()).into());
    }

    // 2-4. Copy, Replace, Delete
    let log_file = args
        .log_file
        .as_deref()
        .map(expand_tilde)
        .or_else(|| cfg.log_file.clone());
    let mut log = log_file
        .as_deref()
        .map(|path| {
            ChangeLog::open(path, &args.source, &args.target)
                .with_context(|| format!("opening change log {}", path.display()))
        })
        .transpose()?;

    let runner = Backup {
        source: &args.source,
        target: &args.target,
        disposal: Disposal::from_config(cfg),
    };
    for action in Action::ALL {
        let outcome = if skipped_by_flag(args, action) || scanned.plan.paths(action).is_empty() {
            skipped_stage(action.label())
        } else {
            let bar = byte_bar(action.label(), scanned.bytes(action));
            let report = runner.run_phase(&scanned.plan, action, log.as_mut(), |n| bar.inc(n));
            bar.finish_and_clear();
            file_outcome(
                action.label(),
                format!("{} files, {}", report.done, human_filesize(report.bytes)),
                &report.failures,
            )
        };
        outcome.print();
        outcomes.push(outcome);
    }
    let phases_failed = outcomes.iter().any(StageOutcome::failed);

    // 5. Ledger
    let section = section_for(&args.target, &cfg.ledger_sections);
    let ledger = match section {
        Some(section) if !phases_failed => {
            let path = backup::ledger_path(&args.target, &cfg.ledger_file);
            run_stage("Ledger", || {
                let changed = ledger::update(&path, &section, today())?;
                Ok(if changed {
                    format!("{section} updated in {}", path.display())
                } else {
                    format!("no '{section}' entry in {}", path.display())
                })
            })
        },
        _ => skipped_stage("Ledger"),
    };
    ledger.print();
    outcomes.push(ledger);

    // 6. Notify
    let any_failed = outcomes.iter().any(StageOutcome::failed);
    let notify = if args.notify && !any_failed {
        run_stage("Notify", || {
            shell::notify(TOOL, "Back up completed successfully!")?;
            Ok(String::new())
        })
    } else {
        skipped_stage("Notify")
    };
    notify.print();
    outcomes.push(notify);

    print_summary(&outcomes, TOOL);
    if outcomes.iter().any(StageOutcome::failed) {
        bail!("back up finished with errors");
    }
    info!(elapsed = %fmt_elapsed(started.elapsed()), "back up done");
    println!("  Finished in {}.", fmt_elapsed(started.elapsed()));
    Ok(())
}
