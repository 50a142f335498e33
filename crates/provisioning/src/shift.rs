// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Start-at shift resolution
//!
//! An execution's `start-at` is a wall-clock specifier that may or may not
//! carry a date. Candidate formats are tried in order, first match wins.
//! A parsed date earlier than today is re-anchored to today's calendar
//! date; a time that then lands before the provisioning start is left in
//! the past (negative shift) instead of rolling to tomorrow, so the
//! executor simply starts on the next pass. Same-day-only on purpose.

use chrono::format::{parse, Parsed, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Formats tried when no explicit time-format is configured, in order
pub const DEFAULT_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%H:%M:%S",
    "%H:%M",
];

/// Resolve a start-at specifier to an offset from `start_time`, in seconds
///
/// An empty specifier or one no candidate format accepts resolves to 0;
/// unrecognized input is logged, never an error.
pub fn start_shift(
    specifier: &str,
    time_format: Option<&str>,
    start_time: NaiveDateTime,
    today: NaiveDate,
) -> f64 {
    if specifier.is_empty() {
        return 0.0;
    }

    let explicit = time_format.filter(|f| !f.is_empty());
    let formats: &[&str] = match &explicit {
        Some(format) => std::slice::from_ref(format),
        None => &DEFAULT_TIME_FORMATS,
    };

    // strptime's implicit date for time-only patterns
    let default_date = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN);

    for format in formats {
        let mut parsed = Parsed::new();
        if parse(&mut parsed, specifier, StrftimeItems::new(format)).is_err() {
            continue;
        }

        let time = parsed.to_naive_time().unwrap_or(NaiveTime::MIN);
        let date = parsed.to_naive_date().unwrap_or(default_date);

        // Past dates anchor to today, keeping the time of day; explicit
        // future dates are honored as given.
        let date = if today > date { today } else { date };

        let when = date.and_time(time);
        return (when - start_time).num_milliseconds() as f64 / 1000.0;
    }

    tracing::warn!(specifier, "unrecognized start-at time format, ignored");
    0.0
}

#[cfg(test)]
#[path = "shift_tests.rs"]
mod tests;
