//! Configuration module for kubeconf
//!
//! Handles loading and validating tool configuration from YAML files and environment variables.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use kubeconf_core::DEFAULT_KUBELET_CONFIG_PATH;

/// Where the kubelet configuration is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Kubelet config file on the local node
    #[default]
    Local,
    /// Node configz endpoint through the API server proxy
    Api,
}

/// Output format for the printed configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Source to read the kubelet configuration from
    #[serde(default)]
    pub source: Source,

    /// Path of the local kubelet config file
    #[serde(default = "default_kubelet_config_path")]
    pub kubelet_config_path: PathBuf,

    /// Kubeconfig used when not running in a cluster (empty: standard lookup)
    #[serde(default)]
    pub kubeconfig_path: PathBuf,

    /// Node name (from K8s downward API)
    #[serde(default)]
    pub node_name: Option<String>,

    /// Output format
    #[serde(default)]
    pub output: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: Source::default(),
            kubelet_config_path: default_kubelet_config_path(),
            kubeconfig_path: PathBuf::new(),
            node_name: None,
            output: OutputFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        match self.source {
            Source::Local => {
                if self.kubelet_config_path.as_os_str().is_empty() {
                    anyhow::bail!("kubelet_config_path must be set for the local source");
                }
            }
            Source::Api => {
                let node_name = self.node_name.as_deref().unwrap_or_default();
                if node_name.trim().is_empty() {
                    anyhow::bail!(
                        "node_name must be set for the api source (config, --node-name or NODE_NAME env)"
                    );
                }
            }
        }
        Ok(())
    }

    /// Override node_name from environment if not set
    pub fn with_node_name_from_env(mut self) -> Self {
        if self.node_name.is_none() {
            self.node_name = std::env::var("NODE_NAME").ok();
        }
        self
    }
}

fn default_kubelet_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_KUBELET_CONFIG_PATH)
}
