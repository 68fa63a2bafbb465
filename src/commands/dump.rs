//! `mediakit dump`: copy one day's media off a card into a collection.
//!
//! # Stages (in order)
//!
//! | # | Stage  | Description                                            |
//! |---|--------|--------------------------------------------------------|
//! | 1 | Scan   | Resolve the volume, select files modified on the date  |
//! | 2 | Stage  | Copy into `<collection>/<staging_dir>`                 |
//! | 3 | Route  | Move into `Photo`/`Video`/`Gopro`/`Drone`              |
//! | 4 | Notify | Desktop notification (`--notify`)                      |
//!
//! The staging directory is removed at the end whether or not the run
//! succeeded.

use std::{path::Path, time::Instant};

use anyhow::{Context, Result, bail};
use tracing::warn;

use super::file_outcome;
use crate::{
    cli::DumpArgs,
    config::DumpConfig,
    dates::{parse_date, today},
    dump::{
        DumpPlan, MediaRules, plan,
        stage::{cleanup_staging, prepare_staging, route_files, stage_files},
        staging_path,
    },
    format::{fmt_elapsed, human_filesize},
    shell,
    ui::{StageOutcome, byte_bar, make_spinner, print_summary, run_stage, skipped_stage},
};

const TOOL: &str = "Dump SD";

/// Execute a dump.
pub fn run(args: &DumpArgs, cfg: &DumpConfig) -> Result<()> {
    let started = Instant::now();
    let date = parse_date(args.date.as_deref().unwrap_or(&cfg.date), today())?;
    let rules = MediaRules::from_config(cfg);
    println!();

    let mut outcomes: Vec<StageOutcome> = Vec::new();

    // 1. Scan
    let mut planned: Option<DumpPlan> = None;
    let scan = run_stage("Scan", || {
        let p = plan::build(&args.volume, &cfg.volumes_root, &args.collection, date, &rules)?;
        let detail = format!("{} files from {} for {date}", p.files.len(), p.volume.display());
        planned = Some(p);
        Ok(detail)
    });
    scan.print();
    let scan_failed = scan.failed();
    outcomes.push(scan);

    let Some(planned) = planned.filter(|_| !scan_failed) else {
        print_summary(&outcomes, TOOL);
        bail!("dump aborted: scan failed");
    };

    if args.dry_run {
        println!();
        for (src, dst) in planned.destinations(&rules) {
            let shown = src.strip_prefix(&planned.volume).unwrap_or(src.as_path());
            println!("     {} → {}", shown.display(), dst.display());
        }
        println!();
        println!("  Dry run, nothing changed.");
        return Ok(());
    }

    let staging = staging_path(&args.collection, &cfg.staging_dir);
    prepare_staging(&staging)
        .with_context(|| format!("preparing staging directory {}", staging.display()))?;

    let dumped = stage_and_route(&planned, &staging, &rules, &mut outcomes);
    if let Err(e) = cleanup_staging(&staging) {
        warn!("could not remove staging directory: {e}");
    }

    // 4. Notify
    let any_failed = outcomes.iter().any(StageOutcome::failed);
    let notify = if args.notify && !any_failed {
        run_stage("Notify", || {
            shell::notify(TOOL, &format!("Dumped {dumped} files from {}", args.volume))?;
            Ok(String::new())
        })
    } else {
        skipped_stage("Notify")
    };
    notify.print();
    outcomes.push(notify);

    print_summary(&outcomes, TOOL);
    if outcomes.iter().any(StageOutcome::failed) {
        bail!("dump finished with errors");
    }
    println!(
        "  Dumped {dumped} files in {}.",
        fmt_elapsed(started.elapsed())
    );
    Ok(())
}

/// Stages 2 and 3. Returns the number of files routed into the collection.
fn stage_and_route(
    planned: &DumpPlan,
    staging: &Path,
    rules: &MediaRules,
    outcomes: &mut Vec<StageOutcome>,
) -> usize {
    // 2. Stage
    let total: u64 = planned
        .files
        .iter()
        .filter_map(|p| p.metadata().ok())
        .map(|m| m.len())
        .sum();
    let bar = byte_bar("Stage", total);
    let staged = stage_files(&planned.files, staging, |n| bar.inc(n));
    bar.finish_and_clear();
    let outcome = file_outcome(
        "Stage",
        format!("{} files, {}", staged.staged.len(), human_filesize(staged.bytes)),
        &staged.failures,
    );
    outcome.print();
    outcomes.push(outcome);

    // 3. Route
    let spinner = make_spinner("Route");
    let routed = route_files(&staged.staged, &planned.collection, rules);
    spinner.finish_and_clear();
    let outcome = file_outcome("Route", routed.summary(), &routed.failures);
    outcome.print();
    outcomes.push(outcome);

    routed.total()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn args(volume: &Path, collection: &Path) -> DumpArgs {
        DumpArgs {
            volume: volume.display().to_string(),
            collection: collection.to_path_buf(),
            date: None,
            dry_run: false,
            notify: false,
        }
    }

    fn card_with_todays_media() -> tempfile::TempDir {
        let card = tempfile::tempdir().unwrap();
        let dcim = card.path().join("DCIM/100GOPRO");
        fs::create_dir_all(&dcim).unwrap();
        fs::write(dcim.join("20240301CL101500_HERO9_0001_Q4K60FPS.MP4"), "vid").unwrap();
        fs::write(dcim.join("DSC00001.JPG"), "photo").unwrap();
        card
    }

    #[test]
    fn run_routes_and_cleans_staging() {
        let card = card_with_todays_media();
        let collection = tempfile::tempdir().unwrap();

        run(&args(card.path(), collection.path()), &DumpConfig::default()).unwrap();

        let c = collection.path();
        assert!(c.join("Gopro/20240301CL101500_HERO9_0001_Q4K60FPS.MP4").is_file());
        assert!(c.join("Photo/DSC00001.JPG").is_file());
        assert!(!c.join(".tmp.dumpsd").exists());
        // The card is never modified.
        assert!(card.path().join("DCIM/100GOPRO/DSC00001.JPG").is_file());
    }

    #[test]
    fn dry_run_writes_nothing() {
        let card = card_with_todays_media();
        let collection = tempfile::tempdir().unwrap();
        let mut a = args(card.path(), collection.path());
        a.dry_run = true;

        run(&a, &DumpConfig::default()).unwrap();

        assert_eq!(fs::read_dir(collection.path()).unwrap().count(), 0);
    }

    #[test]
    fn bad_date_is_rejected_before_scanning() {
        let card = card_with_todays_media();
        let collection = tempfile::tempdir().unwrap();
        let mut a = args(card.path(), collection.path());
        a.date = Some("tomorrow".into());

        let err = run(&a, &DumpConfig::default()).unwrap_err();
        assert!(err.to_string().contains("invalid date 'tomorrow'"));
    }

    #[test]
    fn empty_day_fails_scan() {
        let card = card_with_todays_media();
        let collection = tempfile::tempdir().unwrap();
        let mut a = args(card.path(), collection.path());
        a.date = Some("2001-01-01".into());

        let err = run(&a, &DumpConfig::default()).unwrap_err();
        assert!(err.to_string().contains("scan failed"));
    }
}
