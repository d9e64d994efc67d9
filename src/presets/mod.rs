//! Built-in presets.
//!
//! New presets are added to [`BUILTIN`]; nothing registers itself.

pub mod etcd;

use crate::preset::PresetFactory;
use crate::registry::PresetRegistry;

/// Every preset shipped with this crate, by registry name.
pub const BUILTIN: &[(&str, PresetFactory)] = &[(etcd::NAME, etcd::EtcdPreset::factory)];

/// The built-in preset list.
pub fn builtin() -> &'static [(&'static str, PresetFactory)] {
    BUILTIN
}

/// Register every built-in preset with `registry`.
pub fn register_builtin(registry: &PresetRegistry) {
    registry.register_all(builtin());
}
