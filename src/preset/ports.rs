//! Named port sets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Name of the primary port of a single-port preset.
pub const DEFAULT_PORT: &str = "default";

/// Transport protocol of an exposed port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tcp => write!(f, "tcp"),
            Self::Udp => write!(f, "udp"),
        }
    }
}

/// A single exposed container port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub protocol: Protocol,
    pub port: u16,
}

impl Port {
    pub fn tcp(port: u16) -> Self {
        Self {
            protocol: Protocol::Tcp,
            port,
        }
    }

    pub fn udp(port: u16) -> Self {
        Self {
            protocol: Protocol::Udp,
            port,
        }
    }
}

impl std::fmt::Display for Port {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.port, self.protocol)
    }
}

/// Mapping from logical port name to container port.
///
/// Keys are unique and iterate in sorted order, so two sets built from the
/// same entries render identically.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamedPorts(BTreeMap<String, Port>);

impl NamedPorts {
    pub fn new() -> Self {
        Self::default()
    }

    /// One TCP port registered under [`DEFAULT_PORT`].
    pub fn default_tcp(port: u16) -> Self {
        Self::new().with(DEFAULT_PORT, Port::tcp(port))
    }

    /// Add or replace a named port.
    pub fn with(mut self, name: impl Into<String>, port: Port) -> Self {
        self.0.insert(name.into(), port);
        self
    }

    pub fn get(&self, name: &str) -> Option<Port> {
        self.0.get(name).copied()
    }

    /// The port under [`DEFAULT_PORT`], if any.
    pub fn primary(&self) -> Option<Port> {
        self.get(DEFAULT_PORT)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Port)> {
        self.0.iter().map(|(name, port)| (name.as_str(), *port))
    }
}
