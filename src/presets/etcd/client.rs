//! Probe sessions against etcd's HTTP/JSON gateway.
//!
//! A session is a dedicated `reqwest::Client` pointed at one member. The
//! status request is `POST /v3/maintenance/status`; when credentials are
//! configured the session first calls `POST /v3/auth/authenticate` and sends
//! the returned token in the `Authorization` header.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::Level;
use url::Url;

use super::{DialOptions, EtcdPreset, LogConfig};
use crate::error::{PresetError, Result};
use crate::probe::{ProbeConnector, ProbeSession};

const AUTHENTICATE_PATH: &str = "/v3/auth/authenticate";
const STATUS_PATH: &str = "/v3/maintenance/status";

#[derive(Debug, Deserialize)]
struct AuthenticateResponse {
    #[serde(default)]
    token: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    version: String,
    #[serde(default)]
    leader: Option<serde_json::Value>,
    #[serde(default, rename = "dbSize")]
    db_size: Option<serde_json::Value>,
}

/// Render a loosely typed status field for logging.
fn display_field(value: Option<&serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Null) | None => "unknown".to_string(),
        Some(other) => other.to_string(),
    }
}

/// Opens etcd probe sessions with a preset's timeouts and credentials.
#[derive(Debug, Clone)]
pub struct EtcdConnector {
    dial_timeout: Duration,
    keep_alive_time: Duration,
    keep_alive_timeout: Duration,
    credentials: Option<(String, SecretString)>,
    dial_options: DialOptions,
    log: LogConfig,
}

impl EtcdConnector {
    /// Snapshot the client settings of `preset`.
    ///
    /// Unset transport and log options fall back to their defaults, so this
    /// also works on a preset whose defaults were never resolved.
    pub fn from_preset(preset: &EtcdPreset) -> Self {
        let credentials = if preset.username.is_empty() {
            None
        } else {
            Some((
                preset.username.clone(),
                preset
                    .password
                    .clone()
                    .unwrap_or_else(|| SecretString::from(String::new())),
            ))
        };

        Self {
            dial_timeout: preset.dial_timeout,
            keep_alive_time: preset.dial_keep_alive_time,
            keep_alive_timeout: preset.dial_keep_alive_timeout,
            credentials,
            dial_options: preset.dial_options.clone().unwrap_or_default(),
            log: preset.log_config.clone().unwrap_or_default(),
        }
    }

    fn build_client(&self, address: &str) -> Result<reqwest::Client> {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.dial_options.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                PresetError::InvalidConfig {
                    reason: format!("invalid header name '{name}': {e}"),
                }
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| PresetError::InvalidConfig {
                reason: format!("invalid value for header '{name}': {e}"),
            })?;
            headers.insert(name, value);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if !self.dial_timeout.is_zero() {
            builder = builder.connect_timeout(self.dial_timeout);
        }
        if !self.keep_alive_time.is_zero() {
            builder = builder
                .tcp_keepalive(self.keep_alive_time)
                .http2_keep_alive_interval(self.keep_alive_time);
        }
        if !self.keep_alive_timeout.is_zero() {
            builder = builder.http2_keep_alive_timeout(self.keep_alive_timeout);
        }
        if let Some(user_agent) = &self.dial_options.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        if self.dial_options.http2_prior_knowledge {
            builder = builder.http2_prior_knowledge();
        }

        builder.build().map_err(|e| PresetError::Connection {
            address: address.to_string(),
            source: e,
        })
    }
}

#[async_trait]
impl ProbeConnector for EtcdConnector {
    async fn open(&self, address: &str) -> Result<Box<dyn ProbeSession>> {
        let endpoint =
            Url::parse(&format!("http://{address}")).map_err(|e| PresetError::InvalidConfig {
                reason: format!("invalid endpoint address '{address}': {e}"),
            })?;
        let client = self.build_client(address)?;

        log_at(self.log.level, address, "Opened etcd probe session");

        Ok(Box::new(EtcdSession {
            client,
            endpoint,
            address: address.to_string(),
            credentials: self.credentials.clone(),
            token: None,
            log: self.log.clone(),
        }))
    }
}

/// One short-lived connection to an etcd member.
struct EtcdSession {
    client: reqwest::Client,
    endpoint: Url,
    address: String,
    credentials: Option<(String, SecretString)>,
    token: Option<String>,
    log: LogConfig,
}

impl EtcdSession {
    fn url(&self, path: &str) -> Result<Url> {
        self.endpoint
            .join(path)
            .map_err(|e| PresetError::InvalidConfig {
                reason: format!("invalid request path '{path}': {e}"),
            })
    }

    fn connection_error(&self, source: reqwest::Error) -> PresetError {
        PresetError::Connection {
            address: self.address.clone(),
            source,
        }
    }

    async fn authenticate(&mut self) -> Result<()> {
        let Some((username, password)) = &self.credentials else {
            return Ok(());
        };

        let body = serde_json::json!({
            "name": username,
            "password": password.expose_secret(),
        });
        let response = self
            .client
            .post(self.url(AUTHENTICATE_PATH)?)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.connection_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PresetError::Auth {
                address: self.address.clone(),
                reason: format!("HTTP {status}: {}", detail.trim()),
            });
        }

        let auth: AuthenticateResponse =
            response.json().await.map_err(|e| PresetError::Auth {
                address: self.address.clone(),
                reason: format!("invalid authenticate response: {e}"),
            })?;
        if auth.token.is_empty() {
            return Err(PresetError::Auth {
                address: self.address.clone(),
                reason: "no token returned; is authentication enabled?".to_string(),
            });
        }

        self.token = Some(auth.token);
        Ok(())
    }
}

#[async_trait]
impl ProbeSession for EtcdSession {
    async fn status(&mut self) -> Result<()> {
        if self.token.is_none() {
            self.authenticate().await?;
        }

        let mut request = self
            .client
            .post(self.url(STATUS_PATH)?)
            .json(&serde_json::json!({}));
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, token.as_str());
        }

        let response = request.send().await.map_err(|e| self.connection_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PresetError::Probe {
                address: self.address.clone(),
                reason: format!("HTTP {status}: {}", detail.trim()),
            });
        }

        let member: StatusResponse = response.json().await.map_err(|e| PresetError::Probe {
            address: self.address.clone(),
            reason: format!("invalid status response: {e}"),
        })?;
        if member.version.is_empty() {
            return Err(PresetError::Probe {
                address: self.address.clone(),
                reason: "status response carries no server version".to_string(),
            });
        }

        log_at(
            self.log.level,
            &self.address,
            &format!(
                "etcd member v{} responding (leader {}, db size {})",
                member.version,
                display_field(member.leader.as_ref()),
                display_field(member.db_size.as_ref()),
            ),
        );
        Ok(())
    }

    async fn close(self: Box<Self>) {
        log_at(self.log.level, &self.address, "Released etcd probe session");
        drop(self);
    }
}

fn log_at(level: Level, address: &str, message: &str) {
    if level == Level::ERROR {
        tracing::error!(address, "{}", message);
    } else if level == Level::WARN {
        tracing::warn!(address, "{}", message);
    } else if level == Level::INFO {
        tracing::info!(address, "{}", message);
    } else if level == Level::DEBUG {
        tracing::debug!(address, "{}", message);
    } else {
        tracing::trace!(address, "{}", message);
    }
}
