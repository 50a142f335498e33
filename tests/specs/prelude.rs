//! Shared fixtures for scenario specs

#![allow(dead_code)]

use gust_core::config::ExecutionConfig;
use gust_core::error::ModuleError;
use gust_core::module::{Executor, Module};
use gust_core::FakeClock;
use gust_monitoring::{Datapoint, MonitoringClient, MonitoringListener};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Ordered journal of lifecycle calls, shared across fixtures
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries().iter().filter(|e| *e == entry).count()
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.count(entry) > 0
    }

    /// Position of the first occurrence, for ordering assertions
    pub fn position(&self, entry: &str) -> Option<usize> {
        self.entries().iter().position(|e| e == entry)
    }
}

/// Executor whose run length and configuration are scripted
pub struct ScriptedExecutor {
    name: &'static str,
    execution: ExecutionConfig,
    delay: f64,
    log: CallLog,
    checks_until_done: usize,
    advance_on_check: Option<(FakeClock, Duration)>,
}

impl ScriptedExecutor {
    pub fn new(name: &'static str, log: CallLog) -> Self {
        Self {
            name,
            execution: ExecutionConfig::default(),
            delay: 0.0,
            log,
            checks_until_done: 1,
            advance_on_check: None,
        }
    }

    pub fn with_delay(mut self, delay: &str) -> Self {
        self.execution.delay = Some(delay.to_string());
        self
    }

    pub fn with_start_at(mut self, start_at: &str) -> Self {
        self.execution.start_at = Some(start_at.to_string());
        self
    }

    pub fn with_checks_until_done(mut self, checks: usize) -> Self {
        self.checks_until_done = checks;
        self
    }

    /// Advance the fake clock on every check, pacing the whole run
    pub fn advancing(mut self, clock: FakeClock, step: Duration) -> Self {
        self.advance_on_check = Some((clock, step));
        self
    }
}

impl Module for ScriptedExecutor {
    fn name(&self) -> &str {
        self.name
    }

    fn prepare(&mut self) -> Result<(), ModuleError> {
        self.log.push(format!("{}:prepare", self.name));
        Ok(())
    }

    fn startup(&mut self) -> Result<(), ModuleError> {
        self.log.push(format!("{}:startup", self.name));
        Ok(())
    }

    fn check(&mut self) -> Result<bool, ModuleError> {
        self.log.push(format!("{}:check", self.name));
        if let Some((clock, step)) = &self.advance_on_check {
            clock.advance(*step);
        }
        self.checks_until_done = self.checks_until_done.saturating_sub(1);
        Ok(self.checks_until_done == 0)
    }

    fn shutdown(&mut self) -> Result<(), ModuleError> {
        self.log.push(format!("{}:shutdown", self.name));
        Ok(())
    }

    fn post_process(&mut self) -> Result<(), ModuleError> {
        self.log.push(format!("{}:post_process", self.name));
        Ok(())
    }
}

impl Executor for ScriptedExecutor {
    fn execution(&self) -> &ExecutionConfig {
        &self.execution
    }

    fn delay(&self) -> f64 {
        self.delay
    }

    fn set_delay(&mut self, seconds: f64) {
        self.delay = seconds;
    }
}

/// Monitoring client fed from a queue the test controls
pub struct QueuedClient {
    source: String,
    queue: Arc<Mutex<Vec<Vec<Datapoint>>>>,
}

impl QueuedClient {
    pub fn new(source: &str) -> (Self, Arc<Mutex<Vec<Vec<Datapoint>>>>) {
        let queue = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                source: source.to_string(),
                queue: queue.clone(),
            },
            queue,
        )
    }
}

impl MonitoringClient for QueuedClient {
    fn source(&self) -> &str {
        &self.source
    }

    fn connect(&mut self) {}

    fn check(&mut self) -> Vec<Datapoint> {
        let mut queue = self.queue.lock().unwrap();
        if queue.is_empty() {
            Vec::new()
        } else {
            queue.remove(0)
        }
    }

    fn disconnect(&mut self) {}
}

/// Listener that keeps every delivered batch
#[derive(Clone, Default)]
pub struct BatchJournal(pub Arc<Mutex<Vec<Vec<Datapoint>>>>);

impl BatchJournal {
    pub fn batches(&self) -> Vec<Vec<Datapoint>> {
        self.0.lock().unwrap().clone()
    }
}

impl MonitoringListener for BatchJournal {
    fn monitoring_data(&mut self, batch: &[Datapoint]) {
        self.0.lock().unwrap().push(batch.to_vec());
    }
}
