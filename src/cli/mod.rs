//! CLI command handling.
//!
//! Provides subcommands for:
//! - Listing registered presets (`list`)
//! - Showing what a configured preset asks of the engine (`describe`)
//! - Running a preset's readiness procedure once against a live address (`probe`)

mod presets;

use clap::{ColorChoice, Parser, Subcommand};

use crate::config::Config;
use crate::registry::PresetRegistry;

#[derive(Parser, Debug)]
#[command(name = "harbormock")]
#[command(about = "Inspect and probe ephemeral service presets")]
#[command(
    long_about = "harbormock describes the service containers integration tests depend on.\nExamples:\n  harbormock list --verbose\n  harbormock describe etcd --config '{\"version\":\"3.5.17\"}'\n  harbormock probe etcd --address 127.0.0.1:2379"
)]
#[command(version)]
#[command(color = ColorChoice::Auto)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List registered presets
    List {
        /// Show image and ports for each preset
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show image, ports and environment of a configured preset
    Describe {
        /// Preset name (e.g. "etcd")
        name: String,

        /// Preset parameters as a JSON object
        #[arg(short, long)]
        config: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a preset's health-check once against a running service
    Probe {
        /// Preset name (e.g. "etcd")
        name: String,

        /// Address of the service's primary port (host:port)
        #[arg(short, long)]
        address: String,

        /// Preset parameters as a JSON object
        #[arg(short, long)]
        config: Option<String>,

        /// Run the init procedure instead of the health-check
        #[arg(long)]
        init: bool,
    },
}

/// Run a CLI command against `registry`.
pub async fn run_command(
    command: Command,
    registry: &PresetRegistry,
    config: &Config,
) -> anyhow::Result<()> {
    match command {
        Command::List { verbose } => presets::cmd_list(registry, verbose),
        Command::Describe {
            name,
            config: params,
            json,
        } => presets::cmd_describe(registry, config, &name, params.as_deref(), json),
        Command::Probe {
            name,
            address,
            config: params,
            init,
        } => {
            presets::cmd_probe(registry, config, &name, &address, params.as_deref(), init).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_version() {
        let cmd = Cli::command();
        assert_eq!(
            cmd.get_version().unwrap_or("unknown"),
            env!("CARGO_PKG_VERSION")
        );
    }

    #[test]
    fn test_cli_definition_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_probe() {
        let cli = Cli::try_parse_from([
            "harbormock",
            "probe",
            "etcd",
            "--address",
            "127.0.0.1:2379",
            "--init",
        ])
        .unwrap();

        match cli.command {
            Command::Probe {
                name,
                address,
                config,
                init,
            } => {
                assert_eq!(name, "etcd");
                assert_eq!(address, "127.0.0.1:2379");
                assert!(config.is_none());
                assert!(init);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_probe_requires_address() {
        assert!(Cli::try_parse_from(["harbormock", "probe", "etcd"]).is_err());
    }

    #[tokio::test]
    async fn test_describe_unknown_preset_fails() {
        let registry = PresetRegistry::new();
        crate::presets::register_builtin(&registry);

        let result = run_command(
            Command::Describe {
                name: "nope".to_string(),
                config: None,
                json: false,
            },
            &registry,
            &Config::default(),
        )
        .await;

        let err = result.unwrap_err().to_string();
        assert!(err.contains("Unknown preset 'nope'"));
        assert!(err.contains("etcd"));
    }

    #[tokio::test]
    async fn test_describe_rejects_invalid_json() {
        let registry = PresetRegistry::new();
        crate::presets::register_builtin(&registry);

        let result = run_command(
            Command::Describe {
                name: "etcd".to_string(),
                config: Some("{not json".to_string()),
                json: true,
            },
            &registry,
            &Config::default(),
        )
        .await;

        assert!(result.is_err());
    }
}
