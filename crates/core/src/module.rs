// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Module lifecycle contract and status registry
//!
//! Every engine module obeys the same five-method contract:
//! `prepare -> startup -> check (repeated) -> shutdown -> post_process`.
//! `check()` returning true means the module has nothing more to do this
//! run. Shutdown and post-process are teardown side-effects: shutdown is
//! owed only to modules that actually started, post-process to everything
//! that was prepared, started or not.
//!
//! Lifecycle progress is tracked outside the modules themselves, in a
//! [`ModuleRegistry`] holding one [`ModuleStatus`] per module id. The
//! statuses are ordered, so "was prepared" is `status >= Prepared` and
//! "was started" is `status >= Started`.

use crate::config::ExecutionConfig;
use crate::error::ModuleError;
use crate::id::ModuleId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// The lifecycle contract every engine module implements
pub trait Module: Send {
    /// Display name used in logs
    fn name(&self) -> &str;

    /// Validate configuration and allocate resources; fails fast
    fn prepare(&mut self) -> Result<(), ModuleError>;

    /// Begin active work; called at most once per run
    fn startup(&mut self) -> Result<(), ModuleError>;

    /// One cooperative pass; true means nothing more to do this run
    fn check(&mut self) -> Result<bool, ModuleError>;

    /// Release active resources; callable even if the module never finished
    fn shutdown(&mut self) -> Result<(), ModuleError>;

    /// Final reporting and cleanup; owed whenever prepare succeeded
    fn post_process(&mut self) -> Result<(), ModuleError>;
}

/// A load-generating module driven by the provisioning scheduler
///
/// The scheduler computes each executor's start delay at prepare time and
/// stores it back here; a negative delay just means "start on the first
/// check pass".
pub trait Executor: Module {
    fn execution(&self) -> &ExecutionConfig;
    fn delay(&self) -> f64;
    fn set_delay(&mut self, seconds: f64);
}

/// Lifecycle position of a registered module
///
/// Ordered: a module at `ShutDown` has necessarily been `Prepared` and
/// `Started` before, so range queries replace set membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ModuleStatus {
    Created,
    Prepared,
    Started,
    ShutDown,
    PostProcessed,
}

/// Tracks the lifecycle status of every registered module
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    statuses: HashMap<ModuleId, ModuleStatus>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module as `Created`
    pub fn register(&mut self, id: ModuleId) {
        if self.statuses.insert(id.clone(), ModuleStatus::Created).is_some() {
            tracing::warn!(module = %id, "module re-registered, status reset");
        }
    }

    /// Current status, if the id is registered
    pub fn status(&self, id: &ModuleId) -> Option<ModuleStatus> {
        self.statuses.get(id).copied()
    }

    /// True if the module has reached `at_least` (it may be further along)
    pub fn reached(&self, id: &ModuleId, at_least: ModuleStatus) -> bool {
        self.status(id).is_some_and(|s| s >= at_least)
    }

    /// Mark a module prepared
    pub fn mark_prepared(&mut self, id: &ModuleId) {
        self.advance(id, ModuleStatus::Created, ModuleStatus::Prepared);
    }

    /// Mark a module started; refused unless it is currently prepared
    pub fn mark_started(&mut self, id: &ModuleId) {
        self.advance(id, ModuleStatus::Prepared, ModuleStatus::Started);
    }

    /// Mark a module shut down
    pub fn mark_shut_down(&mut self, id: &ModuleId) {
        self.advance(id, ModuleStatus::Started, ModuleStatus::ShutDown);
    }

    /// Mark a module post-processed
    pub fn mark_post_processed(&mut self, id: &ModuleId) {
        let Some(current) = self.status(id) else {
            tracing::warn!(module = %id, "status change for unregistered module ignored");
            return;
        };
        // Never-started modules jump Prepared -> PostProcessed
        if current == ModuleStatus::PostProcessed || current == ModuleStatus::Created {
            tracing::warn!(
                module = %id,
                status = ?current,
                "post-process mark out of order, ignored"
            );
            return;
        }
        self.statuses.insert(id.clone(), ModuleStatus::PostProcessed);
    }

    fn advance(&mut self, id: &ModuleId, expected: ModuleStatus, next: ModuleStatus) {
        let Some(current) = self.status(id) else {
            tracing::warn!(module = %id, "status change for unregistered module ignored");
            return;
        };
        if current != expected {
            tracing::warn!(
                module = %id,
                status = ?current,
                requested = ?next,
                "status change out of order, ignored"
            );
            return;
        }
        self.statuses.insert(id.clone(), next);
    }
}

/// Cheap-clone handle to the engine's module registry
///
/// The engine owns the registry; the provisioning scheduler holds a clone
/// and flips its executors' statuses during its own lifecycle calls. The
/// lock is uncontended by construction: the whole core runs on one thread.
#[derive(Debug, Clone, Default)]
pub struct SharedRegistry {
    inner: Arc<Mutex<ModuleRegistry>>,
}

impl SharedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, id: ModuleId) {
        self.lock().register(id);
    }

    pub fn status(&self, id: &ModuleId) -> Option<ModuleStatus> {
        self.lock().status(id)
    }

    pub fn reached(&self, id: &ModuleId, at_least: ModuleStatus) -> bool {
        self.lock().reached(id, at_least)
    }

    pub fn mark_prepared(&self, id: &ModuleId) {
        self.lock().mark_prepared(id);
    }

    pub fn mark_started(&self, id: &ModuleId) {
        self.lock().mark_started(id);
    }

    pub fn mark_shut_down(&self, id: &ModuleId) {
        self.lock().mark_shut_down(id);
    }

    pub fn mark_post_processed(&self, id: &ModuleId) {
        self.lock().mark_post_processed(id);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ModuleRegistry> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "module_tests.rs"]
mod tests;
