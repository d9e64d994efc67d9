//! Preset contract shared by every service descriptor.
//!
//! A preset describes one kind of ephemeral service fixture: which image to
//! run, which ports to expose, and which lifecycle directives the engine has
//! to apply once the container is up.
//!
//! ```text
//!   factory() ──▶ blank preset ──▶ mutators ──▶ options()
//!                                                  │
//!                     ┌────────────────────────────┼──────────────────┐
//!                     ▼                            ▼                  ▼
//!               Env(KEY=value)            HealthCheck(fn)        Init(fn)
//!                                          polled by engine      run once
//! ```
//!
//! Defaults are resolved inside [`Preset::options`], not at construction, so
//! callers may still change fields after the factory returns.

pub mod directive;
pub mod once;
pub mod ports;

use crate::config::Config;
use crate::error::Result;

pub use directive::{
    ContainerHandle, Directive, EnvVar, FixedAddress, ReadinessFn, ReadinessFuture, env_vars,
    readiness_fn,
};
pub use once::RunOnce;
pub use ports::{DEFAULT_PORT, NamedPorts, Port, Protocol};

/// Zero-argument constructor producing a blank preset.
pub type PresetFactory = fn() -> Box<dyn Preset>;

/// Trait implemented by every service descriptor.
pub trait Preset: Send + Sync + std::fmt::Debug {
    /// Registry key of this preset type.
    fn name(&self) -> &str;

    /// Fully qualified image reference, deterministic for a fixed configuration.
    fn image(&self) -> String;

    /// Ports the engine must expose. Must not mutate the preset.
    fn ports(&self) -> NamedPorts;

    /// Lifecycle directives for the engine.
    ///
    /// Runs any process-wide one-time setup, resolves defaults for unset
    /// fields, then emits environment assignments followed by the
    /// health-check and init procedures. Calling this repeatedly on an
    /// unchanged preset yields equivalent directives.
    fn options(&mut self) -> Vec<Directive>;

    /// Apply a JSON object of named fields.
    ///
    /// Fields present in `params` overwrite the current values, fields that
    /// are absent are left untouched, the same way a mutator would.
    fn configure(&mut self, params: &serde_json::Value) -> Result<()>;

    /// Apply environment-level defaults from `config`.
    ///
    /// Called before caller parameters, so explicit parameters still win.
    fn apply_config(&mut self, _config: &Config) {}
}
