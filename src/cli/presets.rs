//! Preset inspection and probing commands.

use std::sync::Arc;

use serde::Serialize;

use crate::config::Config;
use crate::preset::{
    ContainerHandle, Directive, EnvVar, FixedAddress, NamedPorts, Preset, env_vars,
};
use crate::registry::PresetRegistry;

#[derive(Debug, Serialize)]
struct PresetSummary {
    name: String,
    image: String,
    ports: NamedPorts,
    env: Vec<EnvVar>,
}

/// Create `name` from the registry, apply environment defaults, then `config`.
fn build_preset(
    registry: &PresetRegistry,
    app_config: &Config,
    name: &str,
    config: Option<&str>,
) -> anyhow::Result<Box<dyn Preset>> {
    let Some(mut preset) = registry.create(name) else {
        anyhow::bail!(
            "Unknown preset '{}'. Available: {}",
            name,
            registry.names().join(", ")
        );
    };

    preset.apply_config(app_config);

    if let Some(raw) = config {
        let params: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| anyhow::anyhow!("--config is not valid JSON: {e}"))?;
        preset.configure(&params)?;
    }

    Ok(preset)
}

pub(super) fn cmd_list(registry: &PresetRegistry, verbose: bool) -> anyhow::Result<()> {
    let names = registry.names();
    if names.is_empty() {
        println!("No presets registered.");
        return Ok(());
    }

    if verbose {
        println!("{:<16} {:<40} PORTS", "NAME", "IMAGE");
        println!("{}", "-".repeat(72));
    }

    for name in &names {
        if verbose {
            let Some(preset) = registry.create(name) else {
                continue;
            };
            let ports: Vec<String> = preset
                .ports()
                .iter()
                .map(|(port_name, port)| format!("{port_name}={port}"))
                .collect();
            println!("{:<16} {:<40} {}", name, preset.image(), ports.join(", "));
        } else {
            println!("{}", name);
        }
    }

    Ok(())
}

pub(super) fn cmd_describe(
    registry: &PresetRegistry,
    app_config: &Config,
    name: &str,
    config: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let mut preset = build_preset(registry, app_config, name, config)?;
    let directives = preset.options();

    let summary = PresetSummary {
        name: preset.name().to_string(),
        image: preset.image(),
        ports: preset.ports(),
        env: env_vars(&directives),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Preset: {}", summary.name);
    println!("  Image: {}", summary.image);
    println!("  Ports:");
    for (port_name, port) in summary.ports.iter() {
        println!("    {:<12} {}", port_name, port);
    }
    println!("  Environment:");
    for var in &summary.env {
        println!("    {}", var);
    }
    let procedures: Vec<&str> = directives
        .iter()
        .filter(|d| d.as_env().is_none())
        .map(Directive::kind)
        .collect();
    println!("  Procedures: {}", procedures.join(", "));

    Ok(())
}

pub(super) async fn cmd_probe(
    registry: &PresetRegistry,
    app_config: &Config,
    name: &str,
    address: &str,
    config: Option<&str>,
    init: bool,
) -> anyhow::Result<()> {
    let mut preset = build_preset(registry, app_config, name, config)?;
    let directives = preset.options();

    let procedure = directives.into_iter().find_map(|d| match d {
        Directive::Init(f) if init => Some(f),
        Directive::HealthCheck(f) if !init => Some(f),
        _ => None,
    });
    let Some(procedure) = procedure else {
        anyhow::bail!(
            "Preset '{}' has no {} procedure",
            name,
            if init { "init" } else { "health-check" }
        );
    };

    let ctx = app_config.probe.context();
    let cancel = ctx.cancellation_token().clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let container: Arc<dyn ContainerHandle> = Arc::new(FixedAddress(address.to_string()));
    let result = procedure(ctx, container).await;
    interrupt.abort();

    match result {
        Ok(()) => {
            println!("{} at {} is ready", name, address);
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("{} at {} is not ready: {}", name, address, e)),
    }
}
