//! Local kubelet config loader
//!
//! Reads the kubelet's own config file from the node filesystem.

use std::path::Path;

use tracing::{debug, info};

use crate::error::KubeletConfigError;
use crate::kubelet::KubeletConfiguration;

/// Where kubeadm-provisioned nodes keep the kubelet config
pub const DEFAULT_KUBELET_CONFIG_PATH: &str = "/var/lib/kubelet/config.yaml";

/// Load a kubelet configuration from a file on the local node
pub fn kubelet_config_from_file<P: AsRef<Path>>(
    path: P,
) -> Result<KubeletConfiguration, KubeletConfigError> {
    let path = path.as_ref();
    debug!(path = ?path, "Reading kubelet config");

    let content = std::fs::read_to_string(path).map_err(|source| KubeletConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let config = kubelet_config_from_yaml(&content)?;
    info!(
        path = ?path,
        topology_manager_policy = ?config.topology_manager_policy,
        "Loaded kubelet config from file"
    );
    Ok(config)
}

/// Parse a kubelet configuration from a YAML (or JSON) document
///
/// An empty document yields the default record.
pub fn kubelet_config_from_yaml(yaml: &str) -> Result<KubeletConfiguration, KubeletConfigError> {
    if yaml.trim().is_empty() {
        return Ok(KubeletConfiguration::default());
    }
    Ok(serde_yaml::from_str(yaml)?)
}
