//! Test doubles for presets and readiness probes.
//!
//! Provides:
//! - [`StubConnector`]: a [`ProbeConnector`] with a scripted outcome that
//!   counts opened and released sessions
//! - [`StubPreset`]: a minimal single-port [`Preset`] whose health-check and
//!   init procedures always succeed
//!
//! # Usage
//!
//! ```rust,no_run
//! use harbormock::probe::{ProbeContext, check};
//! use harbormock::testing::{StubConnector, StubOutcome};
//!
//! # async fn example() {
//! let connector = StubConnector::new(StubOutcome::Unreachable);
//! let result = check(&connector, &ProbeContext::new(), "127.0.0.1:1").await;
//! assert!(result.is_err());
//! assert_eq!(connector.closed(), 1);
//! # }
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{PresetError, Result};
use crate::preset::{Directive, NamedPorts, Preset, readiness_fn};
use crate::probe::{ProbeConnector, ProbeSession};

/// What a [`StubConnector`] session does when probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubOutcome {
    /// Status request succeeds.
    Ready,
    /// Session opens, status request fails as if nothing were listening.
    Unreachable,
    /// Opening the session fails; no session exists to release.
    RefuseOpen,
    /// Status request never completes.
    Hang,
}

#[derive(Debug, Default)]
struct StubCounters {
    opened: AtomicU32,
    closed: AtomicU32,
    addresses: Mutex<Vec<String>>,
}

/// A scripted probe connector for tests.
#[derive(Debug, Clone)]
pub struct StubConnector {
    outcome: StubOutcome,
    counters: Arc<StubCounters>,
}

impl StubConnector {
    pub fn new(outcome: StubOutcome) -> Self {
        Self {
            outcome,
            counters: Arc::new(StubCounters::default()),
        }
    }

    /// Number of sessions successfully opened.
    pub fn opened(&self) -> u32 {
        self.counters.opened.load(Ordering::SeqCst)
    }

    /// Number of sessions released.
    pub fn closed(&self) -> u32 {
        self.counters.closed.load(Ordering::SeqCst)
    }

    /// Addresses passed to `open`, in call order.
    pub fn addresses(&self) -> Vec<String> {
        self.counters
            .addresses
            .lock()
            .map(|a| a.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ProbeConnector for StubConnector {
    async fn open(&self, address: &str) -> Result<Box<dyn ProbeSession>> {
        if let Ok(mut addresses) = self.counters.addresses.lock() {
            addresses.push(address.to_string());
        }

        if self.outcome == StubOutcome::RefuseOpen {
            return Err(PresetError::InvalidConfig {
                reason: format!("stub refused to open session to {address}"),
            });
        }

        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StubSession {
            outcome: self.outcome,
            address: address.to_string(),
            counters: Arc::clone(&self.counters),
        }))
    }
}

struct StubSession {
    outcome: StubOutcome,
    address: String,
    counters: Arc<StubCounters>,
}

#[async_trait]
impl ProbeSession for StubSession {
    async fn status(&mut self) -> Result<()> {
        match self.outcome {
            StubOutcome::Ready => Ok(()),
            StubOutcome::Hang => std::future::pending().await,
            StubOutcome::Unreachable | StubOutcome::RefuseOpen => Err(PresetError::Probe {
                address: self.address.clone(),
                reason: "connection refused".to_string(),
            }),
        }
    }

    async fn close(self: Box<Self>) {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// A minimal single-port preset for registry and engine-side tests.
#[derive(Debug, Clone, Default)]
pub struct StubPreset {
    pub name: String,
    pub version: String,
    pub port: u16,
}

impl StubPreset {
    pub const DEFAULT_VERSION: &'static str = "1.0.0";

    pub fn new(name: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            port,
            ..Default::default()
        }
    }

    fn effective_version(&self) -> &str {
        if self.version.is_empty() {
            Self::DEFAULT_VERSION
        } else {
            &self.version
        }
    }
}

impl Preset for StubPreset {
    fn name(&self) -> &str {
        &self.name
    }

    fn image(&self) -> String {
        format!("docker.io/stub/{}:{}", self.name, self.effective_version())
    }

    fn ports(&self) -> NamedPorts {
        NamedPorts::default_tcp(self.port)
    }

    fn options(&mut self) -> Vec<Directive> {
        if self.version.is_empty() {
            self.version = Self::DEFAULT_VERSION.to_string();
        }

        let ready = readiness_fn(|_ctx, _container| async { Ok(()) });
        vec![
            Directive::env("STUB_NAME", self.name.clone()),
            Directive::HealthCheck(ready.clone()),
            Directive::Init(ready),
        ]
    }

    fn configure(&mut self, params: &serde_json::Value) -> Result<()> {
        if let Some(version) = params.get("version").and_then(|v| v.as_str()) {
            self.version = version.to_string();
        }
        Ok(())
    }
}
