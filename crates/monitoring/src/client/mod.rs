// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pollable telemetry clients
//!
//! Each client implements one wire or local protocol and is polled from
//! the orchestrator's cooperative `check()` pass. Transport and parse
//! failures stay inside the client: it logs, degrades, and yields no
//! further data, but never fails the run.

mod graphite;
mod local;
mod server_agent;

pub use graphite::{FetchError, GraphiteClient, HttpSeriesFetch, SeriesFetch};
pub use local::{LocalClient, ENGINE_LOOP_METRIC};
pub use server_agent::{AgentTransport, ServerAgentClient, TcpTransport, DEFAULT_AGENT_PORT};

use crate::datapoint::Datapoint;
use std::time::{Duration, Instant};

/// Polling cadence unless a block configures its own
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// One polling target owned by the monitoring orchestrator
pub trait MonitoringClient: Send {
    /// Identifier stamped on produced datapoints
    fn source(&self) -> &str;

    /// Open connections and perform any handshake
    fn connect(&mut self);

    /// Poll for new datapoints; a no-op until the interval has elapsed
    fn check(&mut self) -> Vec<Datapoint>;

    /// Release connections
    fn disconnect(&mut self);
}

/// Interval gate deciding when a client may touch I/O again
///
/// The first call is always ready so a fresh client contributes data on
/// the run's first pass.
#[derive(Debug, Clone)]
pub struct PollGate {
    interval: Duration,
    last: Option<Instant>,
}

impl PollGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True when the interval has elapsed; advances the gate when it fires
    pub fn ready(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last {
            if now.duration_since(last) < self.interval {
                return false;
            }
        }
        self.last = Some(now);
        true
    }
}
