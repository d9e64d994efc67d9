//! Preset registry and readiness probes for ephemeral service containers.
//!
//! Integration tests name the external service they need (a database, broker
//! or cache) and configure it; a container engine then pulls the image,
//! exposes the ports, and runs the readiness procedures this crate provides.
//!
//! - [`preset`]: the descriptor contract (image, ports, lifecycle directives)
//! - [`registry`]: name-to-factory lookup, populated explicitly at startup
//! - [`probe`]: the init / health-check protocol built on short-lived sessions
//! - [`presets`]: built-in descriptors
//!
//! ```rust,no_run
//! use harbormock::presets::register_builtin;
//! use harbormock::registry::registry;
//!
//! register_builtin(registry());
//! let mut etcd = registry().create("etcd").expect("etcd is built in");
//! let ports = etcd.ports();
//! let directives = etcd.options();
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod preset;
pub mod presets;
pub mod probe;
pub mod registry;
pub mod testing;

pub use error::{ConfigError, PresetError, Result};
pub use preset::{ContainerHandle, Directive, NamedPorts, Preset, PresetFactory};
pub use registry::{PresetRegistry, registry};
