// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One timestamped, source-tagged bundle of metric values

use serde::Serialize;
use std::collections::BTreeMap;

/// A single poll's worth of metrics from one client
///
/// Ephemeral: produced each poll tick, handed to listeners, not retained.
/// Metric order is stable so logs and fan-out stay deterministic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Datapoint {
    pub source: String,
    pub ts: f64,
    #[serde(flatten)]
    pub metrics: BTreeMap<String, f64>,
}

impl Datapoint {
    pub fn new(source: impl Into<String>, ts: f64) -> Self {
        Self {
            source: source.into(),
            ts,
            metrics: BTreeMap::new(),
        }
    }

    pub fn with_metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.metrics.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}
