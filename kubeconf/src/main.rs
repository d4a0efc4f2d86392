//! kubeconf
//!
//! Reads a node's kubelet configuration, either from the kubelet config file
//! on the node or from the node's configz endpoint through the API server,
//! and prints it.

mod cli;
mod config;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::Cli;
use config::{Config, OutputFormat, Source};
use kubeconf_core::{KubeletConfigProvider, KubeletConfiguration, LocalFileProvider};
use kubeconf_k8s::KubeletApiProvider;

/// Initialize the tracing/logging subsystem
///
/// Logs go to stderr; stdout carries the printed configuration.
fn init_logging(log_level: &str, json_format: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Apply CLI overrides on top of the file configuration
fn apply_overrides(mut config: Config, cli: Cli) -> Config {
    if let Some(source) = cli.source {
        config.source = source;
    }
    if let Some(path) = cli.kubelet_config {
        config.kubelet_config_path = path;
    }
    if let Some(path) = cli.kubeconfig {
        config.kubeconfig_path = path;
    }
    if cli.node_name.is_some() {
        config.node_name = cli.node_name;
    }
    if let Some(output) = cli.output {
        config.output = output;
    }
    config
}

/// Build the provider selected by the configuration
fn create_provider(config: &Config) -> Result<Box<dyn KubeletConfigProvider>> {
    match config.source {
        Source::Local => Ok(Box::new(LocalFileProvider::new(
            config.kubelet_config_path.clone(),
        ))),
        Source::Api => {
            let node_name = config
                .node_name
                .clone()
                .context("Node name must be specified via config, --node-name, or NODE_NAME env")?;
            Ok(Box::new(KubeletApiProvider::new(
                config.kubeconfig_path.clone(),
                node_name,
            )))
        }
    }
}

/// Render the configuration in the requested format
fn render(kubelet_config: &KubeletConfiguration, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => {
            serde_yaml::to_string(kubelet_config).context("Failed to render YAML")
        }
        OutputFormat::Json => serde_json::to_string_pretty(kubelet_config)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .context("Failed to render JSON"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_logging(&cli.log_level, cli.log_json);

    info!(version = env!("CARGO_PKG_VERSION"), "kubeconf starting");

    // Load configuration
    let config = if cli.config.exists() {
        Config::from_file(&cli.config)
            .with_context(|| format!("Failed to load config from {:?}", cli.config))?
    } else {
        warn!(path = ?cli.config, "Config file not found, using defaults");
        Config::default()
    };

    let config = apply_overrides(config, cli).with_node_name_from_env();
    config.validate().context("Invalid configuration")?;

    let provider = create_provider(&config)?;
    info!(source = %provider.describe(), "Reading kubelet config");

    let kubelet_config = provider
        .kubelet_config()
        .await
        .with_context(|| format!("Failed to read kubelet config from {}", provider.describe()))?;

    print!("{}", render(&kubelet_config, config.output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use kubeconf_core::TopologyManagerPolicy;

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::try_parse_from([
            "kubeconf",
            "--source",
            "api",
            "--node-name",
            "worker-1",
            "--output",
            "json",
        ])
        .unwrap();

        let config = apply_overrides(Config::default(), cli);
        assert_eq!(config.source, Source::Api);
        assert_eq!(config.node_name.as_deref(), Some("worker-1"));
        assert_eq!(config.output, OutputFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_kubeconfig_kept_without_flag() {
        std::env::set_var("KUBECONFIG", "/tmp/a:/tmp/b");
        let cli = Cli::try_parse_from(["kubeconf", "--source", "api"]).unwrap();

        let file_config = Config {
            kubeconfig_path: "/etc/kubeconf/kubeconfig".into(),
            ..Default::default()
        };
        let config = apply_overrides(file_config, cli);
        assert_eq!(
            config.kubeconfig_path,
            std::path::PathBuf::from("/etc/kubeconf/kubeconfig")
        );
    }

    #[test]
    fn test_create_provider() {
        let config = Config {
            kubelet_config_path: "/tmp/kubelet.yaml".into(),
            ..Default::default()
        };
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.describe(), "file /tmp/kubelet.yaml");

        let config = Config {
            source: Source::Api,
            node_name: Some("worker-2".to_string()),
            ..Default::default()
        };
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.describe(), "configz of node worker-2");
    }

    #[test]
    fn test_render_only_set_fields() {
        let kubelet_config = KubeletConfiguration::with_topology_manager_policy(Some(
            TopologyManagerPolicy::BestEffort,
        ));

        let yaml = render(&kubelet_config, OutputFormat::Yaml).unwrap();
        assert_eq!(yaml, "topologyManagerPolicy: best-effort\n");

        let json = render(&kubelet_config, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["topologyManagerPolicy"], "best-effort");
        assert_eq!(value.as_object().unwrap().len(), 1);
    }
}
