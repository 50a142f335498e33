// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Humanized duration parsing
//!
//! Config surfaces accept either bare numbers (seconds) or humanized
//! strings ("90s", "1m 30s"). Bare numbers win so that `delay = 30`
//! and `delay = "30"` mean the same thing.

use std::time::Duration;
use thiserror::Error;

/// Error parsing a humanized duration
#[derive(Debug, Error, PartialEq)]
#[error("invalid duration '{value}': {reason}")]
pub struct DurationError {
    pub value: String,
    pub reason: String,
}

/// Parse a humanized duration string into a `Duration`
///
/// Accepts plain numbers as seconds (integer or fractional) and falls back
/// to humantime syntax. Empty input is zero.
pub fn dehumanize(value: &str) -> Result<Duration, DurationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(Duration::ZERO);
    }

    if let Ok(seconds) = trimmed.parse::<f64>() {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(DurationError {
                value: value.to_string(),
                reason: "seconds must be a non-negative number".to_string(),
            });
        }
        return Duration::try_from_secs_f64(seconds).map_err(|e| DurationError {
            value: value.to_string(),
            reason: e.to_string(),
        });
    }

    humantime::parse_duration(trimmed).map_err(|e| DurationError {
        value: value.to_string(),
        reason: e.to_string(),
    })
}
