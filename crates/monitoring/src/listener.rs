// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener interface for monitoring fan-out
//!
//! Listeners receive each batch synchronously, in registration order,
//! from the orchestrator's `check()` pass. Handles are shared so callers
//! keep access to listener state (a criteria's triggered flag) after
//! registration.

use crate::datapoint::Datapoint;
use std::sync::{Arc, Mutex};

/// Receives batches of datapoints collected in one orchestrator pass
pub trait MonitoringListener: Send {
    fn monitoring_data(&mut self, batch: &[Datapoint]);
}

/// Shared handle under which listeners are registered and removed
pub type SharedListener = Arc<Mutex<dyn MonitoringListener>>;

/// Wrap a listener for registration, keeping a typed handle
pub fn shared<L: MonitoringListener + 'static>(listener: L) -> Arc<Mutex<L>> {
    Arc::new(Mutex::new(listener))
}
