// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process sampler for host and engine gauges
//!
//! No network involved: requested metrics are read from the local OS.
//! The engine-loop gauge needs a live handle to the running engine; when
//! none was attached the metric is simply absent from the samples.

use super::{MonitoringClient, PollGate, DEFAULT_INTERVAL};
use crate::datapoint::Datapoint;
use gust_core::clock::Clock;
use gust_core::config::ClientConfig;
use gust_core::engine::EngineHealth;
use sysinfo::System;

/// Run-loop utilization gauge, available only with an engine handle
pub const ENGINE_LOOP_METRIC: &str = "engine-loop";

const SUPPORTED: [&str; 3] = ["cpu", "mem", ENGINE_LOOP_METRIC];

/// Samples local metrics without leaving the process
pub struct LocalClient<C: Clock> {
    source: String,
    metrics: Vec<String>,
    gate: PollGate,
    clock: C,
    system: System,
    engine: Option<EngineHealth>,
}

impl<C: Clock> LocalClient<C> {
    pub fn new(config: &ClientConfig, clock: C) -> Self {
        let source = config
            .label
            .clone()
            .or_else(|| config.address.clone())
            .unwrap_or_else(|| "local".to_string());
        Self {
            source,
            metrics: config.metrics.clone(),
            gate: PollGate::new(config.interval.unwrap_or(DEFAULT_INTERVAL)),
            clock,
            system: System::new(),
            engine: None,
        }
    }

    /// Attach the engine's health gauge, enabling the engine-loop metric
    pub fn with_engine(mut self, health: EngineHealth) -> Self {
        self.engine = Some(health);
        self
    }

    /// Read every available requested metric right now
    pub fn sample(&mut self) -> Vec<Datapoint> {
        let mut datapoint = Datapoint::new(self.source.clone(), self.clock.epoch());

        for metric in &self.metrics {
            match metric.as_str() {
                "cpu" => {
                    self.system.refresh_cpu_all();
                    datapoint.insert("cpu", f64::from(self.system.global_cpu_usage()));
                }
                "mem" => {
                    self.system.refresh_memory();
                    let total = self.system.total_memory();
                    if total > 0 {
                        let used = self.system.used_memory() as f64;
                        datapoint.insert("mem", 100.0 * used / total as f64);
                    }
                }
                ENGINE_LOOP_METRIC => {
                    // Silently absent without an engine handle
                    if let Some(health) = &self.engine {
                        datapoint.insert(metric.clone(), health.utilization());
                    }
                }
                _ => {}
            }
        }

        vec![datapoint]
    }
}

impl<C: Clock> MonitoringClient for LocalClient<C> {
    fn source(&self) -> &str {
        &self.source
    }

    fn connect(&mut self) {
        for metric in &self.metrics {
            if !SUPPORTED.contains(&metric.as_str()) {
                tracing::warn!(
                    source = %self.source,
                    metric = %metric,
                    "unsupported local metric, will be omitted"
                );
            }
        }
    }

    fn check(&mut self) -> Vec<Datapoint> {
        if !self.gate.ready(self.clock.now()) {
            return Vec::new();
        }
        self.sample()
    }

    fn disconnect(&mut self) {}
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
