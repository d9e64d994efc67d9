//! Name-to-factory lookup for preset types.
//!
//! Callers (the engine, a remote front end, the CLI) resolve a preset type by
//! name without knowing it statically. Nothing registers itself: the set of
//! available presets is whatever was passed to [`PresetRegistry::register`] or
//! [`PresetRegistry::register_all`], usually the list from
//! [`crate::presets::builtin`].
//!
//! Registering a name that is already present replaces the earlier factory.

use std::collections::HashMap;
use std::sync::{LazyLock, RwLock};

use crate::preset::{Preset, PresetFactory};

static GLOBAL: LazyLock<PresetRegistry> = LazyLock::new(PresetRegistry::new);

/// The process-wide registry. Starts empty.
pub fn registry() -> &'static PresetRegistry {
    &GLOBAL
}

/// Thread-safe map from preset name to factory.
#[derive(Debug, Default)]
pub struct PresetRegistry {
    factories: RwLock<HashMap<String, PresetFactory>>,
}

impl PresetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `factory` under `name`, replacing any earlier entry.
    pub fn register(&self, name: impl Into<String>, factory: PresetFactory) {
        let name = name.into();
        let mut factories = self
            .factories
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if factories.insert(name.clone(), factory).is_some() {
            tracing::debug!(preset = %name, "Replaced registered preset factory");
        } else {
            tracing::debug!(preset = %name, "Registered preset factory");
        }
    }

    /// Register every `(name, factory)` pair in order.
    pub fn register_all<'a, I>(&self, entries: I)
    where
        I: IntoIterator<Item = &'a (&'a str, PresetFactory)>,
    {
        for (name, factory) in entries {
            self.register(*name, *factory);
        }
    }

    /// The factory registered under `name`, or `None`.
    pub fn find(&self, name: &str) -> Option<PresetFactory> {
        self.factories
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(name)
            .copied()
    }

    /// A fresh blank preset of the named type.
    pub fn create(&self, name: &str) -> Option<Box<dyn Preset>> {
        self.find(name).map(|factory| factory())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .factories
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.factories
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
