//! Error types for preset configuration and readiness probing.

use thiserror::Error;

/// Result type for preset operations.
pub type Result<T> = std::result::Result<T, PresetError>;

/// Errors returned by readiness procedures and preset configuration.
///
/// Init and health-check procedures return these unchanged. Whether an error
/// is fatal is decided by the engine: an init error aborts startup, a
/// health-check error only means "not ready yet".
#[derive(Debug, Error)]
pub enum PresetError {
    /// The probe session could not reach the service.
    #[error("Failed to connect to {address}: {source}")]
    Connection {
        /// Address the session was opened against.
        address: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// A session was established but the status request did not succeed.
    #[error("Status probe against {address} failed: {reason}")]
    Probe {
        /// Address the session was opened against.
        address: String,
        /// What went wrong.
        reason: String,
    },

    /// The service rejected the configured credentials.
    #[error("Authentication against {address} failed: {reason}")]
    Auth {
        /// Address the session was opened against.
        address: String,
        /// What went wrong.
        reason: String,
    },

    /// The caller cancelled the probe context.
    #[error("Probe cancelled")]
    Cancelled,

    /// The probe context deadline passed before the probe finished.
    #[error("Probe deadline exceeded")]
    DeadlineExceeded,

    /// Preset parameters could not be applied.
    #[error("Invalid preset configuration: {reason}")]
    InvalidConfig {
        /// What was wrong with the configuration.
        reason: String,
    },
}

impl PresetError {
    /// Returns true for errors produced by the probe context rather than the service.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}

/// Errors resolving configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}
