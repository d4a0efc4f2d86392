//! Kubelet configz payload
//!
//! The configz endpoint does not return a KubeletConfiguration API object:
//! it returns the configuration fields wrapped under a `kubeletconfig` key,
//! without `apiVersion`/`kind`. Only the topology manager policy is taken
//! from it.

use serde::Deserialize;
use tracing::debug;

use crate::error::KubeletConfigError;
use crate::kubelet::{KubeletConfiguration, TopologyManagerPolicy};

/// Minimal unmarshalling target for a configz response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigzEndpoint {
    #[serde(rename = "kubeletconfig")]
    pub kubelet_config: ConfigzKubeletConfig,
}

/// The `kubeletconfig` object of a configz response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigzKubeletConfig {
    #[serde(default)]
    pub topology_manager_policy: Option<String>,
}

impl ConfigzEndpoint {
    /// Topology manager policy, or `None` if the node reported none
    pub fn topology_manager_policy(&self) -> Option<TopologyManagerPolicy> {
        match self.kubelet_config.topology_manager_policy.as_deref() {
            None | Some("") => None,
            Some(policy) => Some(TopologyManagerPolicy::from(policy)),
        }
    }

    /// Convert into a record with only the topology manager policy set
    pub fn into_kubelet_config(self) -> KubeletConfiguration {
        KubeletConfiguration::with_topology_manager_policy(self.topology_manager_policy())
    }
}

/// Parse a raw configz response body into a kubelet configuration
pub fn parse_configz(body: &[u8]) -> Result<KubeletConfiguration, KubeletConfigError> {
    let endpoint: ConfigzEndpoint = serde_json::from_slice(body)?;
    debug!(
        topology_manager_policy = ?endpoint.kubelet_config.topology_manager_policy,
        "Parsed configz response"
    );
    Ok(endpoint.into_kubelet_config())
}
