// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Module identity and id generation

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Identity of a registered module
///
/// Issued once at registration and used for every status query afterwards,
/// so two modules with the same display name never alias each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub String);

impl ModuleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generates module identifiers
pub trait IdGen: Clone + Send + Sync {
    fn next(&self) -> ModuleId;
}

/// UUID-based id generator for production use
#[derive(Clone, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next(&self) -> ModuleId {
        ModuleId(uuid::Uuid::new_v4().to_string())
    }
}

/// Sequential id generator for testing
#[derive(Clone)]
pub struct SequentialIdGen {
    prefix: String,
    counter: Arc<AtomicU64>,
}

impl SequentialIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl Default for SequentialIdGen {
    fn default() -> Self {
        Self::new("module")
    }
}

impl IdGen for SequentialIdGen {
    fn next(&self) -> ModuleId {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        ModuleId(format!("{}-{}", self.prefix, n))
    }
}
