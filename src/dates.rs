//! Date helpers: CLI date keywords and local-time stamps.

use std::time::SystemTime;

use chrono::{DateTime, Days, Local, NaiveDate};

use crate::error::{Result, ToolkitError};

/// Today's date in the local timezone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse `today`, `yesterday` or an ISO `YYYY-MM-DD` date.
///
/// `today` is passed in rather than read from the clock so callers (and
/// tests) decide what "today" means.
pub fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    match input.trim().to_ascii_lowercase().as_str() {
        "today" => Ok(today),
        "yesterday" => today
            .checked_sub_days(Days::new(1))
            .ok_or_else(|| ToolkitError::InvalidDate(input.to_string())),
        other => {
            // chrono accepts `2019-9-3`; the zero-padded form is required here.
            let well_formed = other.len() == 10
                && other
                    .char_indices()
                    .all(|(i, c)| if i == 4 || i == 7 { c == '-' } else { c.is_ascii_digit() });
            if !well_formed {
                return Err(ToolkitError::InvalidDate(input.to_string()));
            }
            NaiveDate::parse_from_str(other, "%Y-%m-%d")
                .map_err(|_| ToolkitError::InvalidDate(input.to_string()))
        },
    }
}

/// The local calendar date a filesystem timestamp falls on.
pub fn local_date(time: SystemTime) -> NaiveDate {
    DateTime::<Local>::from(time).date_naive()
}

/// Current local time as `YYYY-MM-DD HH:MM:SS`, or `YYYYMMDD_HHMMSS` when
/// `strip` is set.
pub fn systime(strip: bool) -> String {
    let fmt = if strip { "%Y%m%d_%H%M%S" } else { "%Y-%m-%d %H:%M:%S" };
    Local::now().format(fmt).to_string()
}

/// Current local date as `YYYY-MM-DD`, or `YYYYMMDD` when `strip` is set.
pub fn sysdate(strip: bool) -> String {
    let fmt = if strip { "%Y%m%d" } else { "%Y-%m-%d" };
    Local::now().format(fmt).to_string()
}
