// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Monitoring orchestrator
//!
//! Owns the configured protocol clients for the run, polls them from its
//! own `check()` pass, and fans every non-empty batch out to listeners in
//! registration order. Monitoring never finishes on its own; the engine
//! ends the run through its other modules.

use crate::client::{
    GraphiteClient, HttpSeriesFetch, LocalClient, MonitoringClient, ServerAgentClient,
    TcpTransport,
};
use crate::datapoint::Datapoint;
use crate::listener::SharedListener;
use gust_core::clock::Clock;
use gust_core::config::{ClientConfig, MonitoringConfig};
use gust_core::engine::EngineHealth;
use gust_core::error::ModuleError;
use gust_core::module::Module;
use std::collections::BTreeMap;
use std::sync::Arc;

/// What a client constructor gets to work with
pub struct ClientContext<C: Clock> {
    pub clock: C,
    pub engine: Option<EngineHealth>,
}

/// Builds one client from its config block
pub type ClientFactory<C> =
    Box<dyn Fn(&ClientConfig, &ClientContext<C>) -> Result<Box<dyn MonitoringClient>, ModuleError> + Send>;

/// Drives telemetry collection as one engine module
pub struct Monitoring<C: Clock> {
    clock: C,
    config: MonitoringConfig,
    engine: Option<EngineHealth>,
    factories: BTreeMap<String, ClientFactory<C>>,
    clients: Vec<Box<dyn MonitoringClient>>,
    listeners: Vec<SharedListener>,
}

impl<C: Clock + 'static> Monitoring<C> {
    pub fn new(clock: C, config: MonitoringConfig) -> Self {
        let mut monitoring = Self {
            clock,
            config,
            engine: None,
            factories: BTreeMap::new(),
            clients: Vec::new(),
            listeners: Vec::new(),
        };
        monitoring.set_client_factory(
            "server-agent",
            Box::new(|config, context| {
                Ok(Box::new(ServerAgentClient::new(
                    config,
                    TcpTransport::new(),
                    context.clock.clone(),
                )?))
            }),
        );
        monitoring.set_client_factory(
            "graphite",
            Box::new(|config, context| {
                Ok(Box::new(GraphiteClient::new(
                    config,
                    HttpSeriesFetch,
                    context.clock.clone(),
                )?))
            }),
        );
        monitoring.set_client_factory(
            "local",
            Box::new(|config, context| {
                let mut client = LocalClient::new(config, context.clock.clone());
                if let Some(health) = &context.engine {
                    client = client.with_engine(health.clone());
                }
                Ok(Box::new(client))
            }),
        );
        monitoring
    }

    /// Attach the engine health gauge consumed by local clients
    pub fn with_engine_health(mut self, health: EngineHealth) -> Self {
        self.engine = Some(health);
        self
    }

    /// Replace or add the constructor behind a protocol key
    pub fn set_client_factory(&mut self, key: impl Into<String>, factory: ClientFactory<C>) {
        self.factories.insert(key.into(), factory);
    }

    /// Register a listener; callable any time, also before `prepare()`
    pub fn add_listener(&mut self, listener: SharedListener) {
        self.listeners.push(listener);
    }

    /// Remove a listener by handle identity
    pub fn remove_listener(&mut self, listener: &SharedListener) {
        self.listeners.retain(|known| !Arc::ptr_eq(known, listener));
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }
}

impl<C: Clock + 'static> Module for Monitoring<C> {
    fn name(&self) -> &str {
        "monitoring"
    }

    /// Resolve config blocks against the protocol registry
    fn prepare(&mut self) -> Result<(), ModuleError> {
        let context = ClientContext {
            clock: self.clock.clone(),
            engine: self.engine.clone(),
        };
        for (key, blocks) in &self.config.clients {
            let Some(factory) = self.factories.get(key) else {
                tracing::warn!(protocol = %key, "unknown monitoring protocol, skipped");
                continue;
            };
            for block in blocks {
                match factory(block, &context) {
                    Ok(client) => {
                        tracing::debug!(
                            protocol = %key,
                            source = %client.source(),
                            "monitoring client configured"
                        );
                        self.clients.push(client);
                    }
                    Err(error) => {
                        tracing::warn!(
                            protocol = %key,
                            error = %error,
                            "invalid monitoring client block, skipped"
                        );
                    }
                }
            }
        }
        Ok(())
    }

    fn startup(&mut self) -> Result<(), ModuleError> {
        for client in &mut self.clients {
            client.connect();
        }
        Ok(())
    }

    /// Poll ready clients, fan one batch out to every listener
    fn check(&mut self) -> Result<bool, ModuleError> {
        let mut batch: Vec<Datapoint> = Vec::new();
        for client in &mut self.clients {
            batch.extend(client.check());
        }

        if !batch.is_empty() {
            tracing::debug!(count = batch.len(), "datapoints collected");
            for listener in &self.listeners {
                listener
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .monitoring_data(&batch);
            }
        }

        // Monitoring never ends the run on its own
        Ok(false)
    }

    fn shutdown(&mut self) -> Result<(), ModuleError> {
        for client in &mut self.clients {
            client.disconnect();
        }
        Ok(())
    }

    fn post_process(&mut self) -> Result<(), ModuleError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
