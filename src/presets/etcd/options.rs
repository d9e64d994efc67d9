//! Mutators for [`EtcdPreset`].
//!
//! Each mutator overwrites the fields it names and leaves every other field
//! alone. Applied left to right, so for the same field the later one wins.

use std::time::Duration;

use secrecy::SecretString;

use super::{DialOptions, EtcdPreset, LogConfig};

/// In-place change to an [`EtcdPreset`].
pub type EtcdOption = Box<dyn FnOnce(&mut EtcdPreset) + Send>;

/// Image version (tag without the leading `v`).
pub fn with_version(version: impl Into<String>) -> EtcdOption {
    let version = version.into();
    Box::new(move |p| p.version = version)
}

/// Timeout for establishing the probe connection. Zero means no limit
/// beyond the probe context's deadline.
pub fn with_dial_timeout(dial_timeout: Duration) -> EtcdOption {
    Box::new(move |p| p.dial_timeout = dial_timeout)
}

/// Idle time after which the client pings the server to see if the
/// transport is alive.
pub fn with_dial_keep_alive_time(keep_alive_time: Duration) -> EtcdOption {
    Box::new(move |p| p.dial_keep_alive_time = keep_alive_time)
}

/// How long the client waits for a keep-alive response before closing the
/// connection.
pub fn with_dial_keep_alive_timeout(keep_alive_timeout: Duration) -> EtcdOption {
    Box::new(move |p| p.dial_keep_alive_timeout = keep_alive_timeout)
}

/// User name and password for authenticated status requests.
pub fn with_credentials(username: impl Into<String>, password: impl Into<String>) -> EtcdOption {
    let username = username.into();
    let password = SecretString::from(password.into());
    Box::new(move |p| {
        p.username = username;
        p.password = Some(password);
    })
}

/// Transport options for the probe client.
pub fn with_dial_options(dial_options: DialOptions) -> EtcdOption {
    Box::new(move |p| p.dial_options = Some(dial_options))
}

/// Client-side logging. When unset, the process-wide default applies.
pub fn with_log_config(log_config: LogConfig) -> EtcdOption {
    Box::new(move |p| p.log_config = Some(log_config))
}
