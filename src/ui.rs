//! Terminal UI: spinners, byte progress bars, stage lines and prompts.
//!
//! # Design goals
//!
//! - **Clean by default.** While a stage is running the user sees only a spinner (or a byte
//!   progress bar for copy phases) and a short label.
//! - **Informative on failure.** If a stage fails its captured output and error message are
//!   printed in full so the operator can diagnose the problem without re-running.
//! - **Testable without a terminal.** [`StageOutcome`] is a plain data type and progress bars
//!   hide themselves when stderr is not a terminal.
//!
//! # Typical usage
//!
//! ```no_run
//! use mediakit::ui::run_stage;
//!
//! let outcome = run_stage("Scan", || Ok("42 files".to_string()));
//! outcome.print();
//! if outcome.failed() { std::process::exit(1); }
//! ```

use std::time::Duration;

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

// ─── Icons ───────────────────────────────────────────────────────────────────

/// Braille spinner frames, same style as indicatif's default.
static SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Green ✓, printed when a stage succeeds.
fn icon_ok() -> console::StyledObject<&'static str> {
    style("✓").green().bold()
}
/// Red ✗, printed when a stage fails.
fn icon_err() -> console::StyledObject<&'static str> {
    style("✗").red().bold()
}
/// Cyan ✓, printed next to the final success summary.
fn icon_done() -> console::StyledObject<&'static str> {
    style("✓").cyan().bold()
}
/// Dim –, printed for stages that did not run.
fn icon_skip() -> console::StyledObject<&'static str> {
    style("–").dim()
}

// ─── Stage result ─────────────────────────────────────────────────────────────

/// The outcome of a single pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutcome {
    /// Human-readable stage label, e.g. `"Copy"`.
    pub label: String,
    /// Whether the stage completed without error.
    pub success: bool,
    /// Short result text shown next to the label, e.g. `"3 files, 1.2 KB"`.
    pub stdout: String,
    /// Extra failure detail, one item per line (failed files, tool output).
    pub stderr: String,
    /// The error message, if any.
    pub error: Option<String>,
    /// The stage was not run at all.
    pub skipped: bool,
}

impl StageOutcome {
    pub fn ok(label: &str, detail: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            success: true,
            stdout: detail.into(),
            stderr: String::new(),
            error: None,
            skipped: false,
        }
    }

    pub fn failure(label: &str, error: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            success: false,
            stdout: String::new(),
            stderr: detail.into(),
            error: Some(error.into()),
            skipped: false,
        }
    }

    /// Wrap the result of a stage body.
    pub fn from_result(label: &str, result: Result<String>) -> Self {
        match result {
            Ok(detail) => Self::ok(label, detail),
            // `{:#}` keeps the whole context chain on one line.
            Err(e) => Self::failure(label, format!("{e:#}"), ""),
        }
    }

    /// The one-line summary (✓/✗ + label + detail) without colors.
    pub fn line(&self) -> String {
        let icon = match (self.skipped, self.success) {
            (true, _) => "–",
            (false, true) => "✓",
            (false, false) => "✗",
        };
        let mut line = format!("{icon}  {}", self.label);
        if self.skipped {
            line.push_str("  (skipped)");
        } else if !self.stdout.is_empty() {
            line.push_str(&format!("  {}", self.stdout));
        }
        line
    }

    /// Print the one-line summary to stdout.
    ///
    /// On failure, also prints the error message and captured detail so the
    /// operator has everything they need without re-running.
    pub fn print(&self) {
        if self.skipped {
            println!(
                "  {}  {}  {}",
                icon_skip(),
                style(&self.label).dim(),
                style("(skipped)").dim()
            );
            return;
        }

        if self.success {
            if self.stdout.is_empty() {
                println!("  {}  {}", icon_ok(), style(&self.label).bold());
            } else {
                println!(
                    "  {}  {}  {}",
                    icon_ok(),
                    style(&self.label).bold(),
                    style(&self.stdout).dim()
                );
            }
            return;
        }

        println!("  {}  {}", icon_err(), style(&self.label).bold());
        if let Some(ref msg) = self.error {
            eprintln!();
            eprintln!("  {} {}", style("Error:").red().bold(), msg);
        }
        if !self.stderr.is_empty() {
            eprintln!();
            eprintln!("  {} details:", style("►").dim());
            for line in self.stderr.lines() {
                eprintln!("    {line}");
            }
        }
    }

    /// Returns `true` if the stage did not succeed.
    pub const fn failed(&self) -> bool {
        !self.success
    }
}

// ─── Spinner / progress ───────────────────────────────────────────────────────

/// Create and start an indeterminate spinner for `label`.
///
/// The spinner ticks at ~80 ms and is cleared when
/// [`ProgressBar::finish_and_clear`] is called.
pub fn make_spinner(label: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("  {spinner:.cyan}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars(SPINNER_CHARS),
    );
    pb.set_message(format!("{}", style(label).dim()));
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// A byte-count progress bar for copy phases.
pub fn byte_bar(label: &str, total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::with_template(
            "  {spinner:.cyan}  {msg} [{bar:30.cyan/blue}] {bytes}/{total_bytes} ({eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .tick_chars(SPINNER_CHARS)
        .progress_chars("=> "),
    );
    pb.set_message(format!("{}", style(label).dim()));
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

// ─── High-level stage runner ──────────────────────────────────────────────────

/// Run a stage body behind a spinner, returning a [`StageOutcome`].
///
/// The body returns a short detail string on success. The spinner is cleared
/// before the outcome is returned so the caller prints a clean, static line.
pub fn run_stage<F>(label: &str, body: F) -> StageOutcome
where
    F: FnOnce() -> Result<String>,
{
    let spinner = make_spinner(label);
    let result = body();
    spinner.finish_and_clear();
    StageOutcome::from_result(label, result)
}

/// A stage that was not run (disabled by a flag, or nothing to do).
///
/// Counts as a success so the pipeline needs no special cases for optional
/// stages.
pub fn skipped_stage(label: &str) -> StageOutcome {
    StageOutcome {
        skipped: true,
        ..StageOutcome::ok(label, "")
    }
}

/// Print the final summary after all stages have run.
///
/// Shows a success banner when all stages passed, or a failure banner
/// (`"<tool> failed."`) listing the stages that failed.
pub fn print_summary(outcomes: &[StageOutcome], tool: &str) {
    let failed: Vec<&StageOutcome> = outcomes.iter().filter(|o| o.failed()).collect();
    println!();
    if failed.is_empty() {
        println!(
            "  {} {}",
            icon_done(),
            style("All stages completed successfully.").cyan().bold()
        );
    } else {
        eprintln!(
            "  {}  {}",
            icon_err(),
            style(format!("{tool} failed.")).red().bold()
        );
        for o in &failed {
            eprintln!("    {} {}", icon_err(), style(&o.label).red());
        }
    }
    println!();
}

/// Print a block of pre-rendered lines, indented to match the stage lines.
pub fn print_block(text: &str) {
    for line in text.lines() {
        println!("     {line}");
    }
}

// ─── Prompt ───────────────────────────────────────────────────────────────────

/// Ask a yes/no question. Defaults to "no".
pub fn confirm(question: &str) -> Result<bool> {
    inquire::Confirm::new(question)
        .with_default(false)
        .prompt()
        .context("reading confirmation")
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── StageOutcome::failed ──────────────────────────────────────────────────

    #[test]
    fn success_outcome_is_not_failed() {
        assert!(!StageOutcome::ok("Scan", "").failed());
    }

    #[test]
    fn failure_outcome_is_failed() {
        assert!(StageOutcome::failure("Copy", "oh no", "").failed());
    }

    #[test]
    fn from_result_keeps_context_chain() {
        let err = anyhow::anyhow!("disk full").context("copying a.jpg");
        let o = StageOutcome::from_result("Copy", Err(err));
        assert!(o.failed());
        assert_eq!(o.error.as_deref(), Some("copying a.jpg: disk full"));
    }

    // ── run_stage ─────────────────────────────────────────────────────────────

    #[test]
    fn run_stage_success_keeps_detail() {
        let o = run_stage("Scan", || Ok("12 files".into()));
        assert!(o.success);
        assert_eq!(o.label, "Scan");
        assert_eq!(o.stdout, "12 files");
        assert!(o.error.is_none());
    }

    #[test]
    fn run_stage_failure_sets_error() {
        let o = run_stage("Scan", || anyhow::bail!("no such directory"));
        assert!(!o.success);
        assert_eq!(o.error.as_deref(), Some("no such directory"));
    }

    // ── skipped_stage ─────────────────────────────────────────────────────────

    #[test]
    fn skipped_stage_is_success() {
        let o = skipped_stage("Delete");
        assert!(o.success);
        assert!(o.skipped);
        assert_eq!(o.label, "Delete");
    }

    // ── rendering ─────────────────────────────────────────────────────────────

    #[test]
    fn snapshot_stage_lines() {
        let lines: Vec<String> = [
            StageOutcome::ok("Scan", "120 source files"),
            skipped_stage("Delete"),
            StageOutcome::failure("Copy", "2 files failed", "a.jpg\nb.jpg"),
        ]
        .iter()
        .map(StageOutcome::line)
        .collect();
        insta::assert_snapshot!(lines.join("\n"), @r"
        ✓  Scan  120 source files
        –  Delete  (skipped)
        ✗  Copy
        ");
    }

    // ── print_summary ─────────────────────────────────────────────────────────

    #[test]
    fn summary_smoke() {
        print_summary(&[StageOutcome::ok("Scan", ""), skipped_stage("Ledger")], "Back up");
        print_summary(
            &[StageOutcome::failure("Copy", "1 file failed", "x.jpg")],
            "Back up",
        );
    }

    #[test]
    fn byte_bar_tracks_position() {
        let pb = byte_bar("Copy", 100);
        pb.inc(40);
        assert_eq!(pb.position(), 40);
        assert_eq!(pb.length(), Some(100));
        pb.finish_and_clear();
    }
}
