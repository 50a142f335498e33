// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for module lifecycle methods

use crate::duration::DurationError;
use thiserror::Error;

/// Errors a module may raise from its lifecycle methods
///
/// These propagate to the engine run loop, which owns abort policy.
/// Protocol clients never surface their transport errors this way; those
/// are contained and logged at the client.
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("invalid configuration: {message}")]
    Config { message: String },
    #[error(transparent)]
    Duration(#[from] DurationError),
    #[error("startup failed for {module}: {message}")]
    Startup { module: String, message: String },
    #[error("check failed for {module}: {message}")]
    Check { module: String, message: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ModuleError {
    /// Shorthand for configuration failures
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
