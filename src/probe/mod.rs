//! Readiness protocol shared by init and health-check procedures.
//!
//! Each attempt opens a fresh client session against the container's primary
//! port, issues one status request and releases the session, whatever the
//! outcome:
//!
//! ```text
//!   Created ──▶ Connecting ──▶ Probing ──▶ Ready
//!                   │              │
//!                   └──────┬───────┘
//!                          ▼
//!                       Failed
//! ```
//!
//! There is no retry here. The engine runs init once and treats its failure
//! as fatal; it polls the health-check until success or its own deadline.

pub mod context;

use async_trait::async_trait;

use crate::error::Result;
use crate::preset::{ContainerHandle, DEFAULT_PORT};

pub use context::ProbeContext;

/// Stage of a single readiness attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    Created,
    Connecting,
    Probing,
    Ready,
    Failed,
}

impl std::fmt::Display for ProbeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::Connecting => "connecting",
            Self::Probing => "probing",
            Self::Ready => "ready",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Short-lived client session to a running service.
#[async_trait]
pub trait ProbeSession: Send {
    /// Issue one trivial, authenticated status request.
    async fn status(&mut self) -> Result<()>;

    /// Release the session. Called exactly once per opened session.
    async fn close(self: Box<Self>);
}

/// Opens probe sessions speaking one service's wire protocol.
#[async_trait]
pub trait ProbeConnector: Send + Sync {
    /// Open a session against `address` (`host:port`).
    ///
    /// Implementations that fail partway through must release whatever they
    /// already acquired before returning the error.
    async fn open(&self, address: &str) -> Result<Box<dyn ProbeSession>>;
}

/// Run one readiness attempt against `address`.
///
/// The session is released on every path, including when `ctx` is cancelled
/// or its deadline passes during the status request.
pub async fn check(
    connector: &dyn ProbeConnector,
    ctx: &ProbeContext,
    address: &str,
) -> Result<()> {
    tracing::trace!(address, state = %ProbeState::Connecting, "Readiness probe");
    let mut session = match ctx.run(connector.open(address)).await {
        Ok(session) => session,
        Err(e) => {
            tracing::trace!(address, state = %ProbeState::Failed, "Readiness probe");
            return Err(e);
        }
    };

    tracing::trace!(address, state = %ProbeState::Probing, "Readiness probe");
    let outcome = ctx.run(session.status()).await;
    session.close().await;

    let state = if outcome.is_ok() {
        ProbeState::Ready
    } else {
        ProbeState::Failed
    };
    tracing::trace!(address, state = %state, "Readiness probe");

    outcome
}

/// Run one readiness attempt against the container's primary port.
pub async fn check_container(
    connector: &dyn ProbeConnector,
    ctx: &ProbeContext,
    container: &dyn ContainerHandle,
) -> Result<()> {
    let address = container.address(DEFAULT_PORT);
    check(connector, ctx, &address).await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::PresetError;
    use crate::preset::FixedAddress;
    use crate::testing::{StubConnector, StubOutcome};

    #[tokio::test]
    async fn test_ready_releases_session_once() {
        let connector = StubConnector::new(StubOutcome::Ready);

        let result = check(&connector, &ProbeContext::new(), "127.0.0.1:2379").await;

        assert!(result.is_ok());
        assert_eq!(connector.opened(), 1);
        assert_eq!(connector.closed(), 1);
        assert_eq!(connector.addresses(), vec!["127.0.0.1:2379".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_status_still_releases_session() {
        let connector = StubConnector::new(StubOutcome::Unreachable);

        let result = check(&connector, &ProbeContext::new(), "127.0.0.1:1").await;

        assert!(matches!(result, Err(PresetError::Probe { .. })));
        assert_eq!(connector.closed(), 1);
    }

    #[tokio::test]
    async fn test_open_failure_has_nothing_to_release() {
        let connector = StubConnector::new(StubOutcome::RefuseOpen);

        let result = check(&connector, &ProbeContext::new(), "127.0.0.1:1").await;

        assert!(result.is_err());
        assert_eq!(connector.opened(), 0);
        assert_eq!(connector.closed(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_during_status_releases_session() {
        let connector = StubConnector::new(StubOutcome::Hang);
        let ctx = ProbeContext::new().with_timeout(Duration::from_millis(100));

        let result = check(&connector, &ctx, "127.0.0.1:2379").await;

        assert!(matches!(result, Err(PresetError::DeadlineExceeded)));
        assert_eq!(connector.closed(), 1);
    }

    #[tokio::test]
    async fn test_cancel_during_status_releases_session() {
        let connector = StubConnector::new(StubOutcome::Hang);
        let ctx = ProbeContext::new();
        let canceller = ctx.clone();

        let probe = check(&connector, &ctx, "127.0.0.1:2379");
        let cancel = async {
            tokio::task::yield_now().await;
            canceller.cancel();
        };
        let (result, ()) = tokio::join!(probe, cancel);

        assert!(matches!(result, Err(PresetError::Cancelled)));
        assert_eq!(connector.closed(), 1);
    }

    #[tokio::test]
    async fn test_check_container_uses_default_port() {
        let connector = StubConnector::new(StubOutcome::Ready);
        let container = FixedAddress("10.0.0.5:2379".to_string());

        check_container(&connector, &ProbeContext::new(), &container)
            .await
            .unwrap();

        assert_eq!(connector.addresses(), vec!["10.0.0.5:2379".to_string()]);
    }

    #[test]
    fn test_probe_state_display() {
        assert_eq!(ProbeState::Connecting.to_string(), "connecting");
        assert_eq!(ProbeState::Ready.to_string(), "ready");
    }
}
