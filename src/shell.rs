//! Shell helpers: captured command execution, PATH lookup and desktop
//! notifications.
//!
//! Argument building ([`notifier_args`]) is kept separate from execution so
//! it can be unit-tested without spawning anything.

use std::{
    env,
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
};

use tracing::debug;

use crate::error::{IoContext, Result, ToolkitError};

// ─── Captured execution ───────────────────────────────────────────────────────

/// Run a program with arguments, capturing stdout and stderr separately.
///
/// Returns `(success, stdout_text, stderr_text)`. A program that cannot be
/// spawned at all is an error; a non-zero exit is not.
pub fn run_captured(args: &[String]) -> Result<(bool, String, String)> {
    let (prog, rest) = args
        .split_first()
        .ok_or_else(|| ToolkitError::Command("cannot run an empty command".into()))?;

    debug!(command = %args.join(" "), "spawning");
    let output: Output = Command::new(prog)
        .args(rest)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| ToolkitError::Command(format!("failed to spawn {}: {e}", args.join(" "))))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    Ok((output.status.success(), stdout, stderr))
}

/// Result of [`syscmd`]: exit code plus interleaved stdout/stderr text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub output: String,
}

impl CommandOutput {
    pub const fn success(&self) -> bool {
        matches!(self.code, Some(0))
    }
}

/// Run a command line through `sh -c`, merging stderr into stdout.
pub fn syscmd(cmd: &str) -> Result<CommandOutput> {
    debug!(%cmd, "sh -c");
    let output = Command::new("sh")
        .arg("-c")
        .arg(format!("exec 2>&1\n{cmd}"))
        .stdin(Stdio::null())
        .output()
        .at(Path::new("sh"))?;

    Ok(CommandOutput {
        code: output.status.code(),
        output: String::from_utf8_lossy(&output.stdout).into_owned(),
    })
}

// ─── PATH lookup ──────────────────────────────────────────────────────────────

/// Locate `program` on `PATH`. A name containing a slash is checked as-is.
pub fn which(program: &str) -> Option<PathBuf> {
    if program.contains('/') {
        let p = PathBuf::from(program);
        return is_executable(&p).then_some(p);
    }
    let path = env::var_os("PATH")?;
    env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

// ─── Notifications ────────────────────────────────────────────────────────────

/// Arguments for a desktop notification.
///
/// macOS uses `terminal-notifier`; everything else uses `notify-send`.
pub fn notifier_args(title: &str, message: &str) -> Vec<String> {
    if cfg!(target_os = "macos") {
        vec![
            "terminal-notifier".into(),
            "-title".into(),
            title.into(),
            "-message".into(),
            message.into(),
        ]
    } else {
        vec!["notify-send".into(), title.into(), message.into()]
    }
}

/// Send a desktop notification. Errors if the notifier is not installed or
/// exits non-zero.
pub fn notify(title: &str, message: &str) -> Result<()> {
    let args = notifier_args(title, message);
    if which(&args[0]).is_none() {
        return Err(ToolkitError::Command(format!("{} is not installed", args[0])));
    }
    let (ok, _stdout, stderr) = run_captured(&args)?;
    if ok {
        Ok(())
    } else {
        Err(ToolkitError::Command(format!(
            "{} exited non-zero: {}",
            args[0],
            stderr.trim()
        )))
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
