// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Streaming line-protocol client for remote server agents
//!
//! Wire protocol, all lines newline-terminated:
//! handshake `test`, `interval:<secs>`, `metrics:<tab-joined names>`;
//! data lines are tab- or comma-separated numeric values positionally
//! matching the configured metric order; `exit` on shutdown.
//!
//! Reads are non-blocking: the client drains whatever bytes the peer has
//! made readable and buffers partial lines for the next pass, so a slow
//! or silent agent never stalls the run loop.

use super::{MonitoringClient, PollGate, DEFAULT_INTERVAL};
use crate::datapoint::Datapoint;
use gust_core::clock::Clock;
use gust_core::config::ClientConfig;
use gust_core::error::ModuleError;
use std::io::{self, Read, Write};
use std::net::TcpStream;

/// Agent port assumed when the address does not name one
pub const DEFAULT_AGENT_PORT: u16 = 4444;

/// Cap on bytes drained per check pass, to bound time in the run loop
const MAX_DRAIN_BYTES: usize = 64 * 1024;

/// Byte transport beneath the agent protocol
pub trait AgentTransport: Send {
    fn connect(&mut self, address: &str) -> io::Result<()>;
    fn send(&mut self, data: &str) -> io::Result<()>;
    /// Drain the bytes readable right now without blocking
    fn recv_available(&mut self) -> io::Result<Vec<u8>>;
    fn close(&mut self);
}

/// Production transport over a non-blocking TCP stream
#[derive(Debug, Default)]
pub struct TcpTransport {
    stream: Option<TcpStream>,
}

impl TcpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn stream(&mut self) -> io::Result<&mut TcpStream> {
        self.stream
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "transport not connected"))
    }
}

impl AgentTransport for TcpTransport {
    fn connect(&mut self, address: &str) -> io::Result<()> {
        let stream = TcpStream::connect(address)?;
        stream.set_nonblocking(true)?;
        self.stream = Some(stream);
        Ok(())
    }

    fn send(&mut self, data: &str) -> io::Result<()> {
        self.stream()?.write_all(data.as_bytes())
    }

    fn recv_available(&mut self) -> io::Result<Vec<u8>> {
        let stream = self.stream()?;
        let mut available = Vec::new();
        let mut chunk = [0u8; 4096];
        while available.len() < MAX_DRAIN_BYTES {
            match stream.read(&mut chunk) {
                // Peer closed; hand back what we got, next send will error
                Ok(0) => break,
                Ok(n) => available.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(available)
    }

    fn close(&mut self) {
        self.stream = None;
    }
}

/// Polls one remote server agent over a persistent connection
pub struct ServerAgentClient<T: AgentTransport, C: Clock> {
    address: String,
    metrics: Vec<String>,
    gate: PollGate,
    clock: C,
    transport: T,
    pending: String,
    connected: bool,
    degraded: bool,
}

impl<T: AgentTransport, C: Clock> ServerAgentClient<T, C> {
    pub fn new(config: &ClientConfig, transport: T, clock: C) -> Result<Self, ModuleError> {
        let raw = config
            .address
            .clone()
            .ok_or_else(|| ModuleError::config("server-agent block requires an address"))?;
        let address = if raw.contains(':') {
            raw
        } else {
            format!("{}:{}", raw, DEFAULT_AGENT_PORT)
        };
        Ok(Self {
            address,
            metrics: config.metrics.clone(),
            gate: PollGate::new(config.interval.unwrap_or(DEFAULT_INTERVAL)),
            clock,
            transport,
            pending: String::new(),
            connected: false,
            degraded: false,
        })
    }

    fn handshake(&mut self) -> io::Result<()> {
        self.transport.connect(&self.address)?;
        self.transport.send("test\n")?;
        self.transport
            .send(&format!("interval:{}\n", self.gate.interval().as_secs()))?;
        self.transport
            .send(&format!("metrics:{}\n", self.metrics.join("\t")))?;
        Ok(())
    }

    fn degrade(&mut self, stage: &str, error: &io::Error) {
        tracing::warn!(
            address = %self.address,
            stage,
            error = %error,
            "server agent degraded, no further data from this client"
        );
        self.degraded = true;
    }

    /// Parse one complete data line into a datapoint
    fn parse_line(&self, line: &str, ts: f64) -> Datapoint {
        let separator = if line.contains('\t') { '\t' } else { ',' };
        let mut datapoint = Datapoint::new(self.address.clone(), ts);
        for (metric, field) in self.metrics.iter().zip(line.split(separator)) {
            match field.trim().parse::<f64>() {
                Ok(value) => datapoint.insert(metric.clone(), value),
                Err(_) => {
                    tracing::warn!(
                        address = %self.address,
                        metric = %metric,
                        field,
                        "unparseable agent field, omitted"
                    );
                }
            }
        }
        datapoint
    }
}

impl<T: AgentTransport, C: Clock> MonitoringClient for ServerAgentClient<T, C> {
    fn source(&self) -> &str {
        &self.address
    }

    fn connect(&mut self) {
        match self.handshake() {
            Ok(()) => {
                tracing::debug!(address = %self.address, "server agent connected");
                self.connected = true;
            }
            Err(error) => self.degrade("handshake", &error),
        }
    }

    fn check(&mut self) -> Vec<Datapoint> {
        if self.degraded || !self.connected || !self.gate.ready(self.clock.now()) {
            return Vec::new();
        }

        let bytes = match self.transport.recv_available() {
            Ok(bytes) => bytes,
            Err(error) => {
                self.degrade("read", &error);
                return Vec::new();
            }
        };
        self.pending.push_str(&String::from_utf8_lossy(&bytes));

        let ts = self.clock.epoch();
        let mut batch = Vec::new();
        while let Some(newline) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=newline).collect();
            let line = line.trim_end_matches(['\n', '\r']);
            if line.is_empty() {
                continue;
            }
            batch.push(self.parse_line(line, ts));
        }
        // Anything left in `pending` is a partial line, kept for next pass
        batch
    }

    fn disconnect(&mut self) {
        if self.connected && !self.degraded {
            if let Err(error) = self.transport.send("exit\n") {
                tracing::warn!(address = %self.address, error = %error, "exit message failed");
            }
        }
        self.transport.close();
        self.connected = false;
    }
}

#[cfg(test)]
#[path = "server_agent_tests.rs"]
mod tests;
