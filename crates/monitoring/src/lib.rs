// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gust-monitoring: telemetry collection during a test run
//!
//! A monitoring orchestrator owns a set of protocol clients, polls each on
//! its own interval from the engine's cooperative run loop, and fans the
//! collected datapoints out to listeners. Criteria evaluators are
//! listeners that watch one metric subject against a threshold.

pub mod client;
pub mod criteria;
pub mod datapoint;
pub mod listener;
pub mod orchestrator;

// Re-exports
pub use client::{
    AgentTransport, FetchError, GraphiteClient, HttpSeriesFetch, LocalClient, MonitoringClient,
    PollGate, SeriesFetch, ServerAgentClient, TcpTransport, DEFAULT_AGENT_PORT, DEFAULT_INTERVAL,
    ENGINE_LOOP_METRIC,
};
pub use criteria::{Condition, MonitoringCriteria};
pub use datapoint::Datapoint;
pub use listener::{shared, MonitoringListener, SharedListener};
pub use orchestrator::{ClientContext, ClientFactory, Monitoring};
