// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local provisioning: all executors run in-process
//!
//! The scheduler prepares every executor up front, computes each one's
//! start delay from its execution block, and then starts executors from
//! `check()` as their delays elapse. The run is finished only when every
//! executor has both started and reported finished.

use crate::shift::start_shift;
use chrono::NaiveDateTime;
use gust_core::clock::Clock;
use gust_core::duration::dehumanize;
use gust_core::error::ModuleError;
use gust_core::id::{IdGen, ModuleId};
use gust_core::module::{Executor, Module, ModuleStatus, SharedRegistry};

struct ExecutorSlot {
    id: ModuleId,
    executor: Box<dyn Executor>,
}

/// Drives a set of executors through the lifecycle with delayed starts
pub struct LocalProvisioning<C: Clock, G: IdGen> {
    clock: C,
    id_gen: G,
    registry: SharedRegistry,
    slots: Vec<ExecutorSlot>,
    start_time: Option<NaiveDateTime>,
}

impl<C: Clock, G: IdGen> LocalProvisioning<C, G> {
    pub fn new(clock: C, id_gen: G, registry: SharedRegistry) -> Self {
        Self {
            clock,
            id_gen,
            registry,
            slots: Vec::new(),
            start_time: None,
        }
    }

    /// Register an executor; it joins the next run
    pub fn add_executor(&mut self, executor: Box<dyn Executor>) -> ModuleId {
        let id = self.id_gen.next();
        self.registry.register(id.clone());
        tracing::debug!(executor = %executor.name(), id = %id, "executor registered");
        self.slots.push(ExecutorSlot {
            id: id.clone(),
            executor,
        });
        id
    }

    /// Seconds since `prepare()` recorded the reference point
    fn elapsed(&self, start_time: NaiveDateTime) -> f64 {
        (self.clock.wall() - start_time).num_milliseconds() as f64 / 1000.0
    }

    /// Start every prepared executor whose delay has elapsed
    fn start_due_executors(&mut self) -> Result<(), ModuleError> {
        let Some(start_time) = self.start_time else {
            return Ok(());
        };
        let elapsed = self.elapsed(start_time);

        for slot in &mut self.slots {
            if self.registry.status(&slot.id) != Some(ModuleStatus::Prepared) {
                continue;
            }
            if elapsed >= slot.executor.delay() {
                tracing::info!(executor = %slot.executor.name(), "starting executor");
                slot.executor.startup()?;
                self.registry.mark_started(&slot.id);
            }
        }
        Ok(())
    }
}

impl<C: Clock, G: IdGen> Module for LocalProvisioning<C, G> {
    fn name(&self) -> &str {
        "provisioning"
    }

    /// Prepare executors and compute their start delays
    fn prepare(&mut self) -> Result<(), ModuleError> {
        let start_time = self.clock.wall();
        self.start_time = Some(start_time);
        let today = start_time.date();

        for slot in &mut self.slots {
            tracing::debug!(executor = %slot.executor.name(), "preparing executor");
            slot.executor.prepare()?;
            self.registry.mark_prepared(&slot.id);

            let execution = slot.executor.execution().clone();
            let delay = dehumanize(execution.delay.as_deref().unwrap_or("0"))?.as_secs_f64();
            let shift = start_shift(
                execution.start_at.as_deref().unwrap_or(""),
                execution.time_format.as_deref(),
                start_time,
                today,
            );
            slot.executor.set_delay(delay + shift);
            tracing::debug!(
                executor = %slot.executor.name(),
                shift,
                delay,
                total = delay + shift,
                "delay setup"
            );
        }
        Ok(())
    }

    fn startup(&mut self) -> Result<(), ModuleError> {
        Ok(())
    }

    /// Check executors for finish; true once all of them have finished
    fn check(&mut self) -> Result<bool, ModuleError> {
        self.start_due_executors()?;

        let mut finished = true;
        for slot in &mut self.slots {
            if self.registry.reached(&slot.id, ModuleStatus::Started) {
                finished &= slot.executor.check()?;
            } else {
                // A not-yet-started executor can never let the run end
                finished = false;
            }
        }
        Ok(finished)
    }

    /// Shut down executors that actually started
    fn shutdown(&mut self) -> Result<(), ModuleError> {
        for slot in &mut self.slots {
            if self.registry.status(&slot.id) != Some(ModuleStatus::Started) {
                continue;
            }
            tracing::debug!(executor = %slot.executor.name(), "shutdown executor");
            slot.executor.shutdown()?;
            self.registry.mark_shut_down(&slot.id);
        }
        Ok(())
    }

    /// Post-process every prepared executor, started or not
    fn post_process(&mut self) -> Result<(), ModuleError> {
        for slot in &mut self.slots {
            let owed = matches!(
                self.registry.status(&slot.id),
                Some(ModuleStatus::Prepared | ModuleStatus::Started | ModuleStatus::ShutDown)
            );
            if !owed {
                continue;
            }
            tracing::debug!(executor = %slot.executor.name(), "post-process executor");
            slot.executor.post_process()?;
            self.registry.mark_post_processed(&slot.id);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
