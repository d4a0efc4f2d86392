//! Kubelet config provider abstraction
//!
//! A provider is one way of obtaining a node's kubelet configuration.
//! The local file provider lives here; the API provider lives in the
//! Kubernetes crate.

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;

use crate::kubelet::KubeletConfiguration;
use crate::local::kubelet_config_from_file;

/// Source of a kubelet configuration
#[async_trait]
pub trait KubeletConfigProvider: Send + Sync {
    /// Human-readable description of where the config comes from
    fn describe(&self) -> String;

    /// Perform one read of the kubelet configuration
    async fn kubelet_config(&self) -> Result<KubeletConfiguration>;
}

/// Reads the kubelet config file from the local node
#[derive(Debug, Clone)]
pub struct LocalFileProvider {
    path: PathBuf,
}

impl LocalFileProvider {
    /// Create a provider for the given config file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl KubeletConfigProvider for LocalFileProvider {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    async fn kubelet_config(&self) -> Result<KubeletConfiguration> {
        Ok(kubelet_config_from_file(&self.path)?)
    }
}
