//! CLI argument parsing for kubeconf

use std::path::PathBuf;

use clap::Parser;

use crate::config::{OutputFormat, Source};

/// Print a node's kubelet configuration
#[derive(Debug, Parser)]
#[command(name = "kubeconf")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "/etc/kubeconf/config.yaml")]
    pub config: PathBuf,

    /// Where to read the kubelet configuration from (overrides config)
    #[arg(short, long, value_enum)]
    pub source: Option<Source>,

    /// Local kubelet config file (overrides config)
    #[arg(long)]
    pub kubelet_config: Option<PathBuf>,

    /// Kubeconfig used outside a cluster (overrides config)
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,

    /// Node name (overrides config and NODE_NAME env)
    #[arg(long, env = "NODE_NAME")]
    pub node_name: Option<String>,

    /// Output format (overrides config)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "KUBECONF_LOG_LEVEL")]
    pub log_level: String,

    /// Output logs in JSON format
    #[arg(long, default_value = "false", env = "KUBECONF_LOG_JSON")]
    pub log_json: bool,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
