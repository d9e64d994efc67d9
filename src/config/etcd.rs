use std::time::Duration;

use tracing::Level;

use crate::config::helpers::optional_env;
use crate::error::ConfigError;

/// Environment overrides for the etcd preset.
#[derive(Debug, Clone)]
pub struct EtcdDefaults {
    /// Dial timeout applied before caller-supplied options, if set.
    pub dial_timeout: Option<Duration>,
    /// Level at which probe sessions report their own traffic.
    pub client_log_level: Level,
}

impl Default for EtcdDefaults {
    fn default() -> Self {
        Self {
            dial_timeout: None,
            client_log_level: Level::DEBUG,
        }
    }
}

impl EtcdDefaults {
    pub(crate) fn resolve() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let dial_timeout = optional_env("HARBORMOCK_ETCD_DIAL_TIMEOUT_MS")?
            .map(|s| s.trim().parse::<u64>())
            .transpose()
            .map_err(|e| ConfigError::InvalidValue {
                key: "HARBORMOCK_ETCD_DIAL_TIMEOUT_MS".to_string(),
                message: format!("must be a whole number of milliseconds: {e}"),
            })?
            .map(Duration::from_millis);

        let client_log_level = optional_env("HARBORMOCK_ETCD_CLIENT_LOG")?
            .map(|s| s.parse::<Level>())
            .transpose()
            .map_err(|e| ConfigError::InvalidValue {
                key: "HARBORMOCK_ETCD_CLIENT_LOG".to_string(),
                message: format!("must be one of trace, debug, info, warn, error: {e}"),
            })?
            .unwrap_or(defaults.client_log_level);

        Ok(Self {
            dial_timeout,
            client_log_level,
        })
    }
}
