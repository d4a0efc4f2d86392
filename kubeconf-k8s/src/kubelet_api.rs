//! Remote kubelet config loader
//!
//! Reads the topology manager policy of a node from its configz endpoint,
//! proxied through the API server.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use kubeconf_core::{KubeletConfigProvider, KubeletConfiguration};

use super::client::K8sClient;

/// Load a node's kubelet configuration through the API server
///
/// `kubeconfig_path` is only consulted when not running inside a cluster.
/// The returned record carries the topology manager policy and nothing else.
pub async fn kubelet_config_from_kubelet_api(
    kubeconfig_path: impl AsRef<Path>,
    node_name: &str,
) -> Result<KubeletConfiguration> {
    if node_name.trim().is_empty() {
        anyhow::bail!("node name must not be empty");
    }

    debug!(node = node_name, "Loading kubelet config through the API server");
    let client = K8sClient::new(kubeconfig_path)
        .await
        .context("Failed to create Kubernetes client")?;
    client.kubelet_config(node_name).await
}

/// Reads a node's kubelet config through the API server proxy
#[derive(Debug, Clone)]
pub struct KubeletApiProvider {
    kubeconfig_path: PathBuf,
    node_name: String,
}

impl KubeletApiProvider {
    /// Create a provider for the given node
    pub fn new(kubeconfig_path: impl Into<PathBuf>, node_name: impl Into<String>) -> Self {
        Self {
            kubeconfig_path: kubeconfig_path.into(),
            node_name: node_name.into(),
        }
    }

    /// Node whose config is read
    pub fn node_name(&self) -> &str {
        &self.node_name
    }
}

#[async_trait]
impl KubeletConfigProvider for KubeletApiProvider {
    fn describe(&self) -> String {
        format!("configz of node {}", self.node_name)
    }

    async fn kubelet_config(&self) -> Result<KubeletConfiguration> {
        kubelet_config_from_kubelet_api(&self.kubeconfig_path, &self.node_name).await
    }
}
