use std::time::Duration;

use crate::config::helpers::parse_optional_env;
use crate::error::ConfigError;
use crate::probe::ProbeContext;

/// Upper bound on the probe timeout (one day).
pub const MAX_TIMEOUT_SECS: u64 = 24 * 60 * 60;

/// Limits applied to readiness probes started from the command line.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Deadline for a single readiness attempt in seconds.
    pub timeout_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

impl ProbeConfig {
    pub(crate) fn resolve() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let timeout_secs =
            parse_optional_env("HARBORMOCK_PROBE_TIMEOUT_SECS", defaults.timeout_secs)?;
        if timeout_secs == 0 || timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::InvalidValue {
                key: "HARBORMOCK_PROBE_TIMEOUT_SECS".to_string(),
                message: format!("must be between 1 and {MAX_TIMEOUT_SECS} seconds"),
            });
        }
        Ok(Self { timeout_secs })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// A fresh probe context bounded by the configured timeout.
    pub fn context(&self) -> ProbeContext {
        ProbeContext::new().with_timeout(self.timeout())
    }
}
