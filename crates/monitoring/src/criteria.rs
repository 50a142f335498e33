// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Threshold criteria over one metric subject

use crate::datapoint::Datapoint;
use crate::listener::MonitoringListener;
use gust_core::config::CriteriaConfig;

/// Comparison applied between an observed value and the threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Condition {
    #[default]
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
}

impl Condition {
    /// Parse the config spelling; `None` for anything unrecognized
    pub fn parse(symbol: &str) -> Option<Self> {
        match symbol.trim() {
            ">" => Some(Self::GreaterThan),
            ">=" => Some(Self::GreaterOrEqual),
            "<" => Some(Self::LessThan),
            "<=" => Some(Self::LessOrEqual),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::GreaterThan => ">",
            Self::GreaterOrEqual => ">=",
            Self::LessThan => "<",
            Self::LessOrEqual => "<=",
        }
    }

    fn holds(&self, value: f64, threshold: f64) -> bool {
        match self {
            Self::GreaterThan => value > threshold,
            Self::GreaterOrEqual => value >= threshold,
            Self::LessThan => value < threshold,
            Self::LessOrEqual => value <= threshold,
        }
    }
}

/// Watches one `"<source>/<metric>"` subject against a threshold
///
/// State is re-evaluated on every matching datapoint; a batch without a
/// match leaves it untouched. Transitions are logged, repeats are not.
pub struct MonitoringCriteria {
    subject: String,
    threshold: f64,
    condition: Condition,
    triggered: bool,
}

impl MonitoringCriteria {
    pub fn new(subject: impl Into<String>, threshold: f64) -> Self {
        Self {
            subject: subject.into(),
            threshold,
            condition: Condition::default(),
            triggered: false,
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    /// Build from a config block; an unknown condition falls back to `>`
    pub fn from_config(config: &CriteriaConfig) -> Self {
        let condition = Condition::parse(&config.condition).unwrap_or_else(|| {
            tracing::warn!(
                condition = %config.condition,
                subject = %config.subject,
                "unknown criteria condition, using '>'"
            );
            Condition::default()
        });
        Self::new(config.subject.clone(), config.threshold).with_condition(condition)
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn triggered(&self) -> bool {
        self.triggered
    }
}

impl MonitoringListener for MonitoringCriteria {
    fn monitoring_data(&mut self, batch: &[Datapoint]) {
        for datapoint in batch {
            for (metric, value) in &datapoint.metrics {
                if self.subject != format!("{}/{}", datapoint.source, metric) {
                    continue;
                }
                let triggered = self.condition.holds(*value, self.threshold);
                if triggered != self.triggered {
                    tracing::info!(
                        subject = %self.subject,
                        condition = self.condition.symbol(),
                        threshold = self.threshold,
                        value,
                        triggered,
                        "criteria state changed"
                    );
                }
                self.triggered = triggered;
            }
        }
    }
}

#[cfg(test)]
#[path = "criteria_tests.rs"]
mod tests;
