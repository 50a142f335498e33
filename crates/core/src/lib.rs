//! gust-core: Core library for the gust load-test engine
//!
//! This crate provides:
//! - The module lifecycle contract shared by every engine module
//! - A status registry replacing ad-hoc prepared/started bookkeeping
//! - The single-threaded engine run loop and its health gauge
//! - Clock and id abstractions for testable time and identity
//! - Configuration types for executions and monitoring clients

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod clock;
pub mod id;

pub mod config;
pub mod duration;
pub mod engine;
pub mod error;
pub mod module;

// Re-exports
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{
    ClientConfig, Config, ConfigError, CriteriaConfig, EngineSettings, ExecutionConfig,
    MonitoringConfig,
};
pub use duration::{dehumanize, DurationError};
pub use engine::{Engine, EngineError, EngineHealth};
pub use error::ModuleError;
pub use id::{IdGen, ModuleId, SequentialIdGen, UuidIdGen};
pub use module::{Executor, Module, ModuleRegistry, ModuleStatus, SharedRegistry};
