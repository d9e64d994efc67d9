//! Configuration resolved from the environment.
//!
//! Values come from process environment variables. The binary loads a `.env`
//! file through `dotenvy` before resolving, so the same keys may live there.
//!
//! | Key | Default |
//! |-----|---------|
//! | `HARBORMOCK_PROBE_TIMEOUT_SECS` | `10` |
//! | `HARBORMOCK_ETCD_DIAL_TIMEOUT_MS` | unset |
//! | `HARBORMOCK_ETCD_CLIENT_LOG` | `debug` |
//! | `HARBORMOCK_LOG_FORMAT` | `text` |

mod etcd;
pub(crate) mod helpers;
mod probe;

pub use etcd::EtcdDefaults;
pub use probe::{MAX_TIMEOUT_SECS, ProbeConfig};

use crate::config::helpers::optional_env;
use crate::error::ConfigError;

/// Output format of the binary's own logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn resolve() -> Result<Self, ConfigError> {
        match optional_env("HARBORMOCK_LOG_FORMAT")?.as_deref() {
            None | Some("text") => Ok(Self::Text),
            Some("json") => Ok(Self::Json),
            Some(other) => Err(ConfigError::InvalidValue {
                key: "HARBORMOCK_LOG_FORMAT".to_string(),
                message: format!("expected 'text' or 'json', got '{other}'"),
            }),
        }
    }
}

/// Full configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub probe: ProbeConfig,
    pub etcd: EtcdDefaults,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            probe: ProbeConfig::resolve()?,
            etcd: EtcdDefaults::resolve()?,
            log_format: LogFormat::resolve()?,
        })
    }
}
