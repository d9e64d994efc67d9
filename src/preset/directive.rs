//! Lifecycle directives emitted by presets and consumed by the engine.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::Result;
use crate::probe::ProbeContext;

/// Running container as seen by a readiness procedure.
///
/// Implemented by the engine that started the container.
pub trait ContainerHandle: Send + Sync {
    /// Reachable `host:port` address of the named container port.
    fn address(&self, port_name: &str) -> String;
}

/// A container handle that resolves every port name to the same address.
///
/// Useful when probing a service that is already running somewhere known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedAddress(pub String);

impl ContainerHandle for FixedAddress {
    fn address(&self, _port_name: &str) -> String {
        self.0.clone()
    }
}

/// Future returned by a readiness procedure.
pub type ReadinessFuture = BoxFuture<'static, Result<()>>;

/// Health-check or init procedure.
pub type ReadinessFn =
    Arc<dyn Fn(ProbeContext, Arc<dyn ContainerHandle>) -> ReadinessFuture + Send + Sync>;

/// Wrap an async closure as a [`ReadinessFn`].
pub fn readiness_fn<F, Fut>(f: F) -> ReadinessFn
where
    F: Fn(ProbeContext, Arc<dyn ContainerHandle>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(
        move |ctx: ProbeContext, container: Arc<dyn ContainerHandle>| -> ReadinessFuture {
            Box::pin(f(ctx, container))
        },
    )
}

/// Environment variable assignment for the container.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct EnvVar {
    pub key: String,
    pub value: String,
}

impl EnvVar {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl std::fmt::Display for EnvVar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// One lifecycle directive.
///
/// The engine applies environment assignments when creating the container,
/// runs `Init` once the container is reachable, and polls `HealthCheck` until
/// it succeeds or the engine's own deadline expires.
#[derive(Clone)]
pub enum Directive {
    Env(EnvVar),
    HealthCheck(ReadinessFn),
    Init(ReadinessFn),
}

impl Directive {
    pub fn env(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Env(EnvVar::new(key, value))
    }

    pub fn as_env(&self) -> Option<&EnvVar> {
        match self {
            Self::Env(var) => Some(var),
            _ => None,
        }
    }

    pub fn is_health_check(&self) -> bool {
        matches!(self, Self::HealthCheck(_))
    }

    pub fn is_init(&self) -> bool {
        matches!(self, Self::Init(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Env(_) => "env",
            Self::HealthCheck(_) => "health-check",
            Self::Init(_) => "init",
        }
    }
}

impl std::fmt::Debug for Directive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Env(var) => f.debug_tuple("Env").field(var).finish(),
            Self::HealthCheck(_) => f.write_str("HealthCheck(..)"),
            Self::Init(_) => f.write_str("Init(..)"),
        }
    }
}

/// Environment assignments in emission order.
pub fn env_vars(directives: &[Directive]) -> Vec<EnvVar> {
    directives
        .iter()
        .filter_map(Directive::as_env)
        .cloned()
        .collect()
}
