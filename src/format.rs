//! Human-readable sizes and durations for console output.

use std::time::Duration;

const UNITS: [&str; 9] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Format a byte count in 1024 steps.
///
/// Values under 10 keep one decimal place (`1.4 MB`); everything else is
/// rounded to an integer (`512 KB`). Plain bytes never get a decimal.
pub fn human_filesize(bytes: u64) -> String {
    let mut base = 1_f64;
    let mut n = bytes as f64;
    for unit in UNITS {
        n = bytes as f64 / base;
        if n < 9.95 && unit != "B" {
            return format!("{n:.1} {unit}");
        }
        if n.round() < 1000.0 {
            return format!("{} {unit}", n.round() as u64);
        }
        base *= 1024.0;
    }
    format!("{} {}", n.round() as u64, UNITS[UNITS.len() - 1])
}

/// Format an elapsed duration using the largest unit that keeps the value
/// at or above one: seconds, minutes, hours or days.
pub fn fmt_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    let (value, unit) = if secs < 60.0 {
        (secs, "seconds")
    } else if secs < 3600.0 {
        (secs / 60.0, "minutes")
    } else if secs < 86_400.0 {
        (secs / 3600.0, "hours")
    } else {
        (secs / 86_400.0, "days")
    };
    format!("{value:.2} {unit}")
}
