// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP pull client for Graphite-style render endpoints
//!
//! Each ready check issues one GET for the configured metrics over the
//! window since the previous check and merges the latest non-null value
//! of every returned series into a single datapoint. Anything unexpected
//! in the response is logged and yields nothing for that tick.

use super::{MonitoringClient, PollGate, DEFAULT_INTERVAL};
use crate::datapoint::Datapoint;
use gust_core::clock::Clock;
use gust_core::config::ClientConfig;
use gust_core::error::ModuleError;
use serde::Deserialize;
use thiserror::Error;

/// Error fetching or reading a render response
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http request failed: {message}")]
    Http { message: String },
    #[error("failed to read response: {message}")]
    Read { message: String },
}

/// Fetches a render URL and returns the decoded JSON body
pub trait SeriesFetch: Send {
    fn fetch(&self, url: &str) -> Result<serde_json::Value, FetchError>;
}

/// Production fetcher over blocking HTTP
#[derive(Debug, Clone, Default)]
pub struct HttpSeriesFetch;

impl SeriesFetch for HttpSeriesFetch {
    fn fetch(&self, url: &str) -> Result<serde_json::Value, FetchError> {
        let mut response = ureq::get(url).call().map_err(|e| FetchError::Http {
            message: e.to_string(),
        })?;
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| FetchError::Read {
                message: e.to_string(),
            })?;
        serde_json::from_str(&body).map_err(|e| FetchError::Read {
            message: e.to_string(),
        })
    }
}

/// One series in a render response: `[[value|null, ts], ...]`
#[derive(Debug, Deserialize)]
struct Series {
    target: String,
    datapoints: Vec<(Option<f64>, f64)>,
}

/// Pulls time-series values from one Graphite endpoint
pub struct GraphiteClient<F: SeriesFetch, C: Clock> {
    base_url: String,
    source: String,
    metrics: Vec<String>,
    gate: PollGate,
    clock: C,
    fetch: F,
    last_query: Option<f64>,
}

impl<F: SeriesFetch, C: Clock> GraphiteClient<F, C> {
    pub fn new(config: &ClientConfig, fetch: F, clock: C) -> Result<Self, ModuleError> {
        let address = config
            .address
            .clone()
            .ok_or_else(|| ModuleError::config("graphite block requires an address"))?;
        let base_url = if address.starts_with("http://") || address.starts_with("https://") {
            address.clone()
        } else {
            format!("http://{}", address)
        };
        let source = config.label.clone().unwrap_or(address);
        Ok(Self {
            base_url,
            source,
            metrics: config.metrics.clone(),
            gate: PollGate::new(config.interval.unwrap_or(DEFAULT_INTERVAL)),
            clock,
            fetch,
            last_query: None,
        })
    }

    fn render_url(&self, from: f64, until: f64) -> String {
        let targets: String = self
            .metrics
            .iter()
            .map(|metric| format!("&target={}", metric))
            .collect();
        format!(
            "{}/render?format=json{}&from={:.0}&until={:.0}",
            self.base_url, targets, from, until
        )
    }
}

impl<F: SeriesFetch, C: Clock> MonitoringClient for GraphiteClient<F, C> {
    fn source(&self) -> &str {
        &self.source
    }

    fn connect(&mut self) {}

    fn check(&mut self) -> Vec<Datapoint> {
        if !self.gate.ready(self.clock.now()) {
            return Vec::new();
        }

        let now = self.clock.epoch();
        let from = self
            .last_query
            .unwrap_or(now - self.gate.interval().as_secs_f64());
        self.last_query = Some(now);

        let url = self.render_url(from, now);
        let body = match self.fetch.fetch(&url) {
            Ok(body) => body,
            Err(error) => {
                tracing::warn!(source = %self.source, error = %error, "graphite fetch failed");
                return Vec::new();
            }
        };

        let series: Vec<Series> = match serde_json::from_value(body) {
            Ok(series) => series,
            Err(error) => {
                tracing::warn!(source = %self.source, error = %error, "malformed graphite response");
                return Vec::new();
            }
        };

        let mut datapoint = Datapoint::new(self.source.clone(), now);
        for entry in series {
            if !self.metrics.iter().any(|m| *m == entry.target) {
                tracing::debug!(target = %entry.target, "series for unrequested metric, ignored");
                continue;
            }
            // Latest non-null sample in the returned window
            if let Some(value) = entry.datapoints.iter().rev().find_map(|(value, _ts)| *value) {
                datapoint.insert(entry.target, value);
            }
        }

        if datapoint.metrics.is_empty() {
            Vec::new()
        } else {
            vec![datapoint]
        }
    }

    fn disconnect(&mut self) {}
}

#[cfg(test)]
#[path = "graphite_tests.rs"]
mod tests;
