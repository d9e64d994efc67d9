//! Register → find → configure → directives, as an engine would drive it.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use harbormock::preset::{ContainerHandle, DEFAULT_PORT, EnvVar, FixedAddress, Port, env_vars};
use harbormock::presets::{self, etcd};
use harbormock::probe::ProbeContext;
use harbormock::testing::StubPreset;
use harbormock::{Directive, Preset, PresetRegistry, registry};

fn svc() -> Box<dyn Preset> {
    Box::new(StubPreset::new("svc", 6379))
}

#[tokio::test]
async fn end_to_end_with_stub_preset() {
    let registry = PresetRegistry::new();
    registry.register("svc", svc);

    let factory = registry.find("svc").expect("svc registered");
    let mut preset = factory();

    let ports = preset.ports();
    assert_eq!(ports.len(), 1);
    assert_eq!(ports.get(DEFAULT_PORT), Some(Port::tcp(6379)));

    let directives = preset.options();
    assert_eq!(directives.iter().filter(|d| d.is_health_check()).count(), 1);
    assert_eq!(directives.iter().filter(|d| d.is_init()).count(), 1);
    assert_eq!(env_vars(&directives), vec![EnvVar::new("STUB_NAME", "svc")]);

    let container: Arc<dyn ContainerHandle> = Arc::new(FixedAddress("127.0.0.1:6379".into()));
    for directive in directives {
        match directive {
            Directive::Init(f) | Directive::HealthCheck(f) => {
                f(ProbeContext::new(), Arc::clone(&container)).await.unwrap();
            }
            Directive::Env(_) => {}
        }
    }
}

#[test]
fn end_to_end_with_builtin_etcd() {
    let registry = PresetRegistry::new();
    presets::register_builtin(&registry);

    let mut preset = registry.create(etcd::NAME).expect("etcd is built in");
    assert_eq!(preset.image(), "quay.io/coreos/etcd:v3.4.24");
    assert_eq!(preset.ports().primary(), Some(Port::tcp(2379)));

    let directives = preset.options();
    assert_eq!(directives.len(), 4);
    assert_eq!(directives.iter().filter(|d| d.is_health_check()).count(), 1);
    assert_eq!(directives.iter().filter(|d| d.is_init()).count(), 1);
    assert_eq!(env_vars(&directives).len(), 2);
}

#[test]
fn configure_through_registry_matches_mutators() {
    let registry = PresetRegistry::new();
    presets::register_builtin(&registry);

    let mut from_json = registry.create(etcd::NAME).unwrap();
    from_json
        .configure(&serde_json::json!({"version": "3.5.17"}))
        .unwrap();

    let from_mutators = etcd::preset([etcd::with_version("3.5.17")]);

    assert_eq!(from_json.image(), from_mutators.image());
    assert_eq!(from_json.ports(), from_mutators.ports());
}

#[test]
fn global_registry_serves_builtin_presets() {
    presets::register_builtin(registry());

    assert!(registry().names().contains(&"etcd".to_string()));
    assert!(registry().find("etcd").is_some());
    assert!(registry().find("unregistered").is_none());
}
