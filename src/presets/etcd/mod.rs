//! etcd preset.
//!
//! Runs `quay.io/coreos/etcd` with its client port exposed as the default
//! port. Init and health-check both open a short-lived session against the
//! HTTP/JSON gateway on that port and ask for the member status.
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use harbormock::preset::Preset;
//! use harbormock::presets::etcd::{EtcdPreset, with_dial_timeout, with_version};
//!
//! let mut preset = EtcdPreset::new([
//!     with_version("3.5.17"),
//!     with_dial_timeout(Duration::from_secs(2)),
//! ]);
//! assert_eq!(preset.image(), "quay.io/coreos/etcd:v3.5.17");
//! let directives = preset.options();
//! ```

pub mod client;
pub mod options;

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::config::{Config, EtcdDefaults};
use crate::error::{PresetError, Result};
use crate::preset::{Directive, NamedPorts, Preset, ReadinessFn, RunOnce, readiness_fn};
use crate::probe;

pub use client::EtcdConnector;
pub use options::{
    EtcdOption, with_credentials, with_dial_keep_alive_time, with_dial_keep_alive_timeout,
    with_dial_options, with_dial_timeout, with_log_config, with_version,
};

/// Registry key.
pub const NAME: &str = "etcd";
/// Client port inside the container.
pub const DEFAULT_CLIENT_PORT: u16 = 2379;
/// Image version used when none is configured.
pub const DEFAULT_VERSION: &str = "3.4.24";

const IMAGE_REPOSITORY: &str = "quay.io/coreos/etcd";

static CLIENT_SETUP: RunOnce = RunOnce::new();
static CLIENT_LOG_LEVEL: OnceLock<Level> = OnceLock::new();

/// Resolve the process-wide default client log level.
fn setup_client_logging() {
    let level = match EtcdDefaults::resolve() {
        Ok(defaults) => defaults.client_log_level,
        Err(e) => {
            tracing::warn!("Ignoring etcd client log override: {}", e);
            EtcdDefaults::default().client_log_level
        }
    };
    let _ = CLIENT_LOG_LEVEL.set(level);
}

fn default_client_log_level() -> Level {
    CLIENT_LOG_LEVEL.get().copied().unwrap_or(Level::DEBUG)
}

/// Transport options for the probe client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct DialOptions {
    /// Extra headers sent with every request (e.g. for a fronting proxy).
    pub headers: Vec<(String, String)>,
    /// User agent reported by the probe client.
    pub user_agent: Option<String>,
    /// Speak HTTP/2 without upgrade negotiation.
    pub http2_prior_knowledge: bool,
}

/// Client-side logging for probe sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Level at which sessions report opening, status and release.
    pub level: Level,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
        }
    }
}

/// Configurable etcd descriptor.
///
/// Zero-valued fields mean "unset". Defaults are filled in by
/// [`Preset::options`], not earlier, so the fields can still be changed
/// directly after construction.
#[derive(Debug, Clone, Default)]
pub struct EtcdPreset {
    /// Image version without the leading `v`. Empty selects [`DEFAULT_VERSION`].
    pub version: String,
    /// Timeout for establishing the probe connection.
    pub dial_timeout: Duration,
    /// Idle time after which the client pings the server.
    pub dial_keep_alive_time: Duration,
    /// Time to wait for a keep-alive response before closing the connection.
    pub dial_keep_alive_timeout: Duration,
    /// User name for authentication. Empty disables authentication.
    pub username: String,
    /// Password for authentication.
    pub password: Option<SecretString>,
    /// Transport options for the probe client.
    pub dial_options: Option<DialOptions>,
    /// Client-side logging; the process-wide default applies when unset.
    pub log_config: Option<LogConfig>,
}

impl EtcdPreset {
    /// A preset with `opts` applied in order to a blank value.
    pub fn new(opts: impl IntoIterator<Item = EtcdOption>) -> Self {
        let mut preset = Self::default();
        for opt in opts {
            opt(&mut preset);
        }
        preset
    }

    /// Registry factory.
    pub fn factory() -> Box<dyn Preset> {
        Box::new(Self::default())
    }

    fn effective_version(&self) -> &str {
        if self.version.is_empty() {
            DEFAULT_VERSION
        } else {
            &self.version
        }
    }

    fn set_defaults(&mut self) {
        if self.dial_options.is_none() {
            self.dial_options = Some(DialOptions::default());
        }
        if self.log_config.is_none() {
            self.log_config = Some(LogConfig {
                level: default_client_log_level(),
            });
        }
        if self.version.is_empty() {
            self.version = DEFAULT_VERSION.to_string();
        }
    }
}

/// `preset(opts)` as a boxed [`Preset`].
pub fn preset(opts: impl IntoIterator<Item = EtcdOption>) -> Box<dyn Preset> {
    Box::new(EtcdPreset::new(opts))
}

fn readiness(connector: Arc<EtcdConnector>, phase: &'static str) -> ReadinessFn {
    readiness_fn(move |ctx, container| {
        let connector = Arc::clone(&connector);
        async move {
            tracing::trace!(preset = NAME, phase, "Running readiness procedure");
            probe::check_container(connector.as_ref(), &ctx, container.as_ref()).await
        }
    })
}

impl Preset for EtcdPreset {
    fn name(&self) -> &str {
        NAME
    }

    fn image(&self) -> String {
        format!("{IMAGE_REPOSITORY}:v{}", self.effective_version())
    }

    fn ports(&self) -> NamedPorts {
        NamedPorts::default_tcp(DEFAULT_CLIENT_PORT)
    }

    fn options(&mut self) -> Vec<Directive> {
        CLIENT_SETUP.run(setup_client_logging);

        self.set_defaults();

        let connector = Arc::new(EtcdConnector::from_preset(self));
        vec![
            Directive::env(
                "ETCD_ADVERTISE_CLIENT_URLS",
                format!("http://127.0.0.1:{DEFAULT_CLIENT_PORT}"),
            ),
            Directive::env(
                "ETCD_LISTEN_CLIENT_URLS",
                format!("http://0.0.0.0:{DEFAULT_CLIENT_PORT}"),
            ),
            Directive::HealthCheck(readiness(Arc::clone(&connector), "health-check")),
            Directive::Init(readiness(connector, "init")),
        ]
    }

    fn configure(&mut self, params: &serde_json::Value) -> Result<()> {
        let params: EtcdParams =
            serde_json::from_value(params.clone()).map_err(|e| PresetError::InvalidConfig {
                reason: format!("etcd: {e}"),
            })?;
        for opt in params.into_options()? {
            opt(self);
        }
        Ok(())
    }

    fn apply_config(&mut self, config: &Config) {
        if let Some(dial_timeout) = config.etcd.dial_timeout {
            with_dial_timeout(dial_timeout)(self);
        }
    }
}

/// JSON form of the mutators. Durations are in milliseconds.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
struct EtcdParams {
    version: Option<String>,
    dial_timeout: Option<u64>,
    dial_keep_alive_time: Option<u64>,
    dial_keep_alive_timeout: Option<u64>,
    username: Option<String>,
    password: Option<String>,
    dial_options: Option<DialOptions>,
    log_level: Option<String>,
}

impl EtcdParams {
    fn into_options(self) -> Result<Vec<EtcdOption>> {
        let mut opts = Vec::new();
        if let Some(version) = self.version {
            opts.push(with_version(version));
        }
        if let Some(ms) = self.dial_timeout {
            opts.push(with_dial_timeout(Duration::from_millis(ms)));
        }
        if let Some(ms) = self.dial_keep_alive_time {
            opts.push(with_dial_keep_alive_time(Duration::from_millis(ms)));
        }
        if let Some(ms) = self.dial_keep_alive_timeout {
            opts.push(with_dial_keep_alive_timeout(Duration::from_millis(ms)));
        }
        match (self.username, self.password) {
            (Some(username), password) => {
                opts.push(with_credentials(username, password.unwrap_or_default()));
            }
            (None, Some(_)) => {
                return Err(PresetError::InvalidConfig {
                    reason: "etcd: password given without username".to_string(),
                });
            }
            (None, None) => {}
        }
        if let Some(dial_options) = self.dial_options {
            opts.push(with_dial_options(dial_options));
        }
        if let Some(level) = self.log_level {
            let level = level
                .parse::<Level>()
                .map_err(|e| PresetError::InvalidConfig {
                    reason: format!("etcd: invalid log-level '{level}': {e}"),
                })?;
            opts.push(with_log_config(LogConfig { level }));
        }
        Ok(opts)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;
    use crate::preset::{DEFAULT_PORT, EnvVar, Port, env_vars};

    #[test]
    fn test_image_uses_default_version_when_unset() {
        let preset = EtcdPreset::default();
        assert_eq!(preset.image(), "quay.io/coreos/etcd:v3.4.24");
        assert!(preset.version.is_empty(), "image() must not resolve defaults");
    }

    #[test]
    fn test_image_uses_configured_version() {
        let preset = EtcdPreset::new([with_version("3.9.0")]);
        assert_eq!(preset.image(), "quay.io/coreos/etcd:v3.9.0");
        assert_eq!(preset.image(), preset.image());
    }

    #[test]
    fn test_ports_single_default_entry() {
        let preset = EtcdPreset::default();
        let ports = preset.ports();

        assert_eq!(ports.len(), 1);
        assert_eq!(ports.get(DEFAULT_PORT), Some(Port::tcp(2379)));
    }

    #[test]
    fn test_defaults_resolved_lazily() {
        let mut preset = EtcdPreset::default();
        assert!(preset.dial_options.is_none());
        assert!(preset.log_config.is_none());

        preset.version = "3.5.1".to_string();
        preset.options();

        assert_eq!(preset.version, "3.5.1");
        assert_eq!(preset.dial_options, Some(DialOptions::default()));
        assert!(preset.log_config.is_some());
    }

    #[test]
    fn test_options_sets_default_version() {
        let mut preset = EtcdPreset::default();
        preset.options();
        assert_eq!(preset.version, DEFAULT_VERSION);
    }

    #[test]
    fn test_options_stable_across_calls() {
        let mut preset = EtcdPreset::default();
        let first = preset.options();
        let second = preset.options();

        assert_eq!(env_vars(&first), env_vars(&second));
        assert_eq!(first.len(), second.len());
        assert_eq!(
            env_vars(&first),
            vec![
                EnvVar::new("ETCD_ADVERTISE_CLIENT_URLS", "http://127.0.0.1:2379"),
                EnvVar::new("ETCD_LISTEN_CLIENT_URLS", "http://0.0.0.0:2379"),
            ]
        );
        assert_eq!(first.iter().filter(|d| d.is_health_check()).count(), 1);
        assert_eq!(first.iter().filter(|d| d.is_init()).count(), 1);
    }

    #[test]
    fn test_client_setup_runs_once_across_concurrent_presets() {
        std::thread::scope(|s| {
            for _ in 0..100 {
                s.spawn(|| {
                    let mut preset = EtcdPreset::default();
                    preset.options();
                });
            }
        });

        assert_eq!(CLIENT_SETUP.executions(), 1);
        assert!(CLIENT_SETUP.is_completed());
    }

    #[test]
    fn test_explicit_log_config_kept() {
        let mut preset = EtcdPreset::new([with_log_config(LogConfig {
            level: Level::INFO,
        })]);
        preset.options();
        assert_eq!(preset.log_config.map(|c| c.level), Some(Level::INFO));
    }

    #[test]
    fn test_configure_overwrites_named_fields_only() {
        let mut preset = EtcdPreset::new([
            with_version("3.4.0"),
            with_dial_timeout(Duration::from_secs(5)),
        ]);

        preset
            .configure(&serde_json::json!({
                "version": "3.5.17",
                "username": "root",
                "password": "pw",
                "dial-options": {"user-agent": "probe/1.0"},
                "log-level": "info",
            }))
            .unwrap();

        assert_eq!(preset.version, "3.5.17");
        assert_eq!(preset.dial_timeout, Duration::from_secs(5));
        assert_eq!(preset.username, "root");
        assert_eq!(
            preset.password.as_ref().map(|p| p.expose_secret()),
            Some("pw")
        );
        assert_eq!(
            preset.dial_options.and_then(|o| o.user_agent),
            Some("probe/1.0".to_string())
        );
        assert_eq!(preset.log_config.map(|c| c.level), Some(Level::INFO));
    }

    #[test]
    fn test_configure_durations_in_millis() {
        let mut preset = EtcdPreset::default();
        preset
            .configure(&serde_json::json!({
                "dial-timeout": 1500,
                "dial-keep-alive-time": 30000,
                "dial-keep-alive-timeout": 2000,
            }))
            .unwrap();

        assert_eq!(preset.dial_timeout, Duration::from_millis(1500));
        assert_eq!(preset.dial_keep_alive_time, Duration::from_secs(30));
        assert_eq!(preset.dial_keep_alive_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_configure_rejects_unknown_fields() {
        let mut preset = EtcdPreset::default();
        let err = preset
            .configure(&serde_json::json!({"auto-sync": true}))
            .unwrap_err();
        assert!(matches!(err, PresetError::InvalidConfig { .. }));
    }

    #[test]
    fn test_configure_rejects_password_without_username() {
        let mut preset = EtcdPreset::default();
        let err = preset
            .configure(&serde_json::json!({"password": "pw"}))
            .unwrap_err();
        assert!(err.to_string().contains("password given without username"));
        assert!(preset.password.is_none());
    }

    #[test]
    fn test_configure_rejects_bad_log_level() {
        let mut preset = EtcdPreset::default();
        assert!(
            preset
                .configure(&serde_json::json!({"log-level": "chatty"}))
                .is_err()
        );
    }

    #[test]
    fn test_apply_config_sets_dial_timeout_before_params() {
        let mut config = Config::default();
        config.etcd.dial_timeout = Some(Duration::from_millis(750));

        let mut preset = EtcdPreset::default();
        preset.apply_config(&config);
        assert_eq!(preset.dial_timeout, Duration::from_millis(750));

        preset
            .configure(&serde_json::json!({"dial-timeout": 2000}))
            .unwrap();
        assert_eq!(preset.dial_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_apply_config_without_override_keeps_fields() {
        let mut preset = EtcdPreset::new([with_dial_timeout(Duration::from_secs(5))]);
        preset.apply_config(&Config::default());
        assert_eq!(preset.dial_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_preset_helper_boxes_configured_value() {
        let boxed = preset([with_version("3.5.0")]);
        assert_eq!(boxed.name(), "etcd");
        assert_eq!(boxed.image(), "quay.io/coreos/etcd:v3.5.0");
    }
}
