// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine run loop
//!
//! Single-threaded cooperative driver: every started module gets one
//! `check()` call per pass, then the loop sleeps out the remainder of the
//! check interval. Teardown is partial-failure-safe: shutdown is owed only
//! to modules that started, post-processing to everything that prepared,
//! and both run even when a lifecycle call failed mid-run.

use crate::clock::Clock;
use crate::config::EngineSettings;
use crate::error::ModuleError;
use crate::id::{IdGen, ModuleId};
use crate::module::{Module, ModuleStatus, SharedRegistry};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

/// Pause between check passes unless configured otherwise
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Errors surfaced by the engine run loop
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("module '{module}' failed during {phase}: {source}")]
    Module {
        module: String,
        phase: &'static str,
        #[source]
        source: ModuleError,
    },
}

/// Shared gauge of run-loop utilization
///
/// Fraction of each pass spent in `check()` calls rather than sleeping,
/// in `[0, 1]`. The local monitoring client reports this as the
/// engine-loop metric when it holds a handle.
#[derive(Debug, Clone, Default)]
pub struct EngineHealth {
    utilization: Arc<Mutex<f64>>,
}

impl EngineHealth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent loop utilization
    pub fn utilization(&self) -> f64 {
        *self.utilization.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record one pass: time spent working against the pass budget
    pub fn record(&self, busy: Duration, budget: Duration) {
        let ratio = if budget.is_zero() {
            1.0
        } else {
            (busy.as_secs_f64() / budget.as_secs_f64()).clamp(0.0, 1.0)
        };
        let mut utilization = self.utilization.lock().unwrap_or_else(|e| e.into_inner());
        *utilization = ratio;
    }
}

struct Slot {
    id: ModuleId,
    module: Box<dyn Module>,
    service: bool,
}

/// Drives top-level modules through the shared lifecycle
pub struct Engine<C: Clock, G: IdGen> {
    clock: C,
    id_gen: G,
    registry: SharedRegistry,
    modules: Vec<Slot>,
    check_interval: Duration,
    health: EngineHealth,
}

impl<C: Clock, G: IdGen> Engine<C, G> {
    pub fn new(clock: C, id_gen: G) -> Self {
        Self {
            clock,
            id_gen,
            registry: SharedRegistry::new(),
            modules: Vec::new(),
            check_interval: DEFAULT_CHECK_INTERVAL,
            health: EngineHealth::new(),
        }
    }

    /// Apply file-level engine settings
    pub fn with_settings(mut self, settings: &EngineSettings) -> Self {
        if let Some(interval) = settings.check_interval {
            self.check_interval = interval;
        }
        self
    }

    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    pub fn check_interval(&self) -> Duration {
        self.check_interval
    }

    /// Handle to the module status registry
    pub fn registry(&self) -> SharedRegistry {
        self.registry.clone()
    }

    /// Handle to the loop health gauge
    pub fn health(&self) -> EngineHealth {
        self.health.clone()
    }

    /// Register a run-gating module; the run ends once all of these finish
    pub fn add_module(&mut self, module: Box<dyn Module>) -> ModuleId {
        self.insert(module, false)
    }

    /// Register a service: polled every pass, never gates run completion
    ///
    /// Monitoring belongs here; its `check()` reports unfinished forever.
    pub fn add_service(&mut self, module: Box<dyn Module>) -> ModuleId {
        self.insert(module, true)
    }

    fn insert(&mut self, module: Box<dyn Module>, service: bool) -> ModuleId {
        let id = self.id_gen.next();
        self.registry.register(id.clone());
        tracing::debug!(module = %module.name(), id = %id, service, "module registered");
        self.modules.push(Slot {
            id: id.clone(),
            module,
            service,
        });
        id
    }

    /// Run to completion: all modules report finished
    pub fn run(&mut self) -> Result<(), EngineError> {
        self.run_inner(None)
    }

    /// Run until all modules finish or the time limit elapses
    pub fn run_for(&mut self, limit: Duration) -> Result<(), EngineError> {
        self.run_inner(Some(limit))
    }

    fn run_inner(&mut self, limit: Option<Duration>) -> Result<(), EngineError> {
        let run_error = self.drive(limit).err();
        let teardown_error = self.teardown();
        match run_error.or(teardown_error) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn drive(&mut self, limit: Option<Duration>) -> Result<(), EngineError> {
        for slot in &mut self.modules {
            tracing::debug!(module = %slot.module.name(), "preparing module");
            slot.module.prepare().map_err(|source| EngineError::Module {
                module: slot.module.name().to_string(),
                phase: "prepare",
                source,
            })?;
            self.registry.mark_prepared(&slot.id);
        }

        for slot in &mut self.modules {
            tracing::debug!(module = %slot.module.name(), "starting module");
            slot.module.startup().map_err(|source| EngineError::Module {
                module: slot.module.name().to_string(),
                phase: "startup",
                source,
            })?;
            self.registry.mark_started(&slot.id);
        }

        let run_started = self.clock.now();
        loop {
            let pass_started = self.clock.now();
            let mut finished = true;
            for slot in &mut self.modules {
                let done = slot.module.check().map_err(|source| EngineError::Module {
                    module: slot.module.name().to_string(),
                    phase: "check",
                    source,
                })?;
                if !slot.service {
                    finished &= done;
                }
            }

            let busy = self.clock.now() - pass_started;
            self.health.record(busy, self.check_interval);

            if finished {
                tracing::info!("all modules finished");
                return Ok(());
            }
            if let Some(limit) = limit {
                if self.clock.now() - run_started >= limit {
                    tracing::info!(?limit, "time limit reached");
                    return Ok(());
                }
            }

            let idle = self.check_interval.saturating_sub(busy);
            if !idle.is_zero() {
                std::thread::sleep(idle);
            }
        }
    }

    fn teardown(&mut self) -> Option<EngineError> {
        let mut first_error = None;

        for slot in &mut self.modules {
            if self.registry.status(&slot.id) != Some(ModuleStatus::Started) {
                continue;
            }
            tracing::debug!(module = %slot.module.name(), "shutdown");
            if let Err(source) = slot.module.shutdown() {
                tracing::warn!(module = %slot.module.name(), error = %source, "shutdown failed");
                first_error.get_or_insert(EngineError::Module {
                    module: slot.module.name().to_string(),
                    phase: "shutdown",
                    source,
                });
            }
            self.registry.mark_shut_down(&slot.id);
        }

        for slot in &mut self.modules {
            let owed = matches!(
                self.registry.status(&slot.id),
                Some(ModuleStatus::Prepared | ModuleStatus::Started | ModuleStatus::ShutDown)
            );
            if !owed {
                continue;
            }
            tracing::debug!(module = %slot.module.name(), "post-process");
            if let Err(source) = slot.module.post_process() {
                tracing::warn!(module = %slot.module.name(), error = %source, "post-process failed");
                first_error.get_or_insert(EngineError::Module {
                    module: slot.module.name().to_string(),
                    phase: "post_process",
                    source,
                });
            }
            self.registry.mark_post_processed(&slot.id);
        }

        first_error
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
