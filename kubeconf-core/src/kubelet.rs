//! Kubelet configuration record
//!
//! Mirrors the subset of `kubelet.config.k8s.io/v1beta1` KubeletConfiguration
//! that node agents read. Every field is optional; keys the record does not
//! model are ignored on load.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Topology manager policy (NUMA-aware resource alignment)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TopologyManagerPolicy {
    /// No alignment is performed
    None,
    /// Prefer NUMA alignment, admit the pod regardless
    BestEffort,
    /// Reject pods whose resources cannot be aligned
    Restricted,
    /// Reject pods that do not fit on a single NUMA node
    SingleNumaNode,
    /// A policy string this crate does not know about, kept verbatim
    Other(String),
}

impl TopologyManagerPolicy {
    /// Wire name of the policy
    pub fn as_str(&self) -> &str {
        match self {
            TopologyManagerPolicy::None => "none",
            TopologyManagerPolicy::BestEffort => "best-effort",
            TopologyManagerPolicy::Restricted => "restricted",
            TopologyManagerPolicy::SingleNumaNode => "single-numa-node",
            TopologyManagerPolicy::Other(s) => s,
        }
    }
}

impl From<String> for TopologyManagerPolicy {
    fn from(s: String) -> Self {
        match s.as_str() {
            "none" => TopologyManagerPolicy::None,
            "best-effort" => TopologyManagerPolicy::BestEffort,
            "restricted" => TopologyManagerPolicy::Restricted,
            "single-numa-node" => TopologyManagerPolicy::SingleNumaNode,
            _ => TopologyManagerPolicy::Other(s),
        }
    }
}

impl From<&str> for TopologyManagerPolicy {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<TopologyManagerPolicy> for String {
    fn from(policy: TopologyManagerPolicy) -> Self {
        match policy {
            TopologyManagerPolicy::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TopologyManagerPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Granularity at which the topology manager aligns resources
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TopologyManagerScope {
    /// Align each container separately
    Container,
    /// Align all containers of a pod together
    Pod,
    /// Unknown scope, kept verbatim
    Other(String),
}

impl TopologyManagerScope {
    /// Wire name of the scope
    pub fn as_str(&self) -> &str {
        match self {
            TopologyManagerScope::Container => "container",
            TopologyManagerScope::Pod => "pod",
            TopologyManagerScope::Other(s) => s,
        }
    }
}

impl From<String> for TopologyManagerScope {
    fn from(s: String) -> Self {
        match s.as_str() {
            "container" => TopologyManagerScope::Container,
            "pod" => TopologyManagerScope::Pod,
            _ => TopologyManagerScope::Other(s),
        }
    }
}

impl From<TopologyManagerScope> for String {
    fn from(scope: TopologyManagerScope) -> Self {
        match scope {
            TopologyManagerScope::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TopologyManagerScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kubelet configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KubeletConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Directory of static pod manifests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_pod_path: Option<String>,

    /// Max period between synchronizing running containers and config
    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub sync_frequency: Option<Duration>,

    /// IP address the kubelet serves on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only_port: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_domain: Option<String>,

    #[serde(rename = "clusterDNS", skip_serializing_if = "Vec::is_empty")]
    pub cluster_dns: Vec<String>,

    /// cgroupfs or systemd
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cgroup_driver: Option<String>,

    #[serde(rename = "cgroupsPerQOS", skip_serializing_if = "Option::is_none")]
    pub cgroups_per_qos: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_manager_policy: Option<String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub cpu_manager_policy_options: BTreeMap<String, String>,

    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub cpu_manager_reconcile_period: Option<Duration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_manager_policy: Option<String>,

    /// NUMA alignment policy; the only field the configz loader fills in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topology_manager_policy: Option<TopologyManagerPolicy>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub topology_manager_scope: Option<TopologyManagerScope>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub topology_manager_policy_options: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_pods: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pod_pids_limit: Option<i64>,

    /// Resources reserved for system daemons (cpu, memory, ...)
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub system_reserved: BTreeMap<String, String>,

    /// Resources reserved for kubernetes components
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub kube_reserved: BTreeMap<String, String>,

    /// CPU list reserved for system and kubernetes daemons, e.g. "0-1"
    #[serde(rename = "reservedSystemCPUs", skip_serializing_if = "Option::is_none")]
    pub reserved_system_cpus: Option<String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub eviction_hard: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub feature_gates: BTreeMap<String, bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_swap_on: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate_certificates: Option<bool>,

    #[serde(rename = "serverTLSBootstrap", skip_serializing_if = "Option::is_none")]
    pub server_tls_bootstrap: Option<bool>,
}

impl KubeletConfiguration {
    /// Record carrying only a topology manager policy
    pub fn with_topology_manager_policy(policy: Option<TopologyManagerPolicy>) -> Self {
        Self {
            topology_manager_policy: policy,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_wire_names() {
        assert_eq!(
            TopologyManagerPolicy::from("single-numa-node"),
            TopologyManagerPolicy::SingleNumaNode
        );
        assert_eq!(
            TopologyManagerPolicy::from("best-effort"),
            TopologyManagerPolicy::BestEffort
        );
        assert_eq!(TopologyManagerPolicy::Restricted.to_string(), "restricted");
        assert_eq!(String::from(TopologyManagerPolicy::None), "none");
    }

    #[test]
    fn test_unknown_policy_preserved() {
        let policy = TopologyManagerPolicy::from("prefer-closest-numa");
        assert_eq!(
            policy,
            TopologyManagerPolicy::Other("prefer-closest-numa".to_string())
        );
        assert_eq!(policy.as_str(), "prefer-closest-numa");
    }

    #[test]
    fn test_default_is_empty() {
        let config = KubeletConfiguration::default();
        assert!(config.topology_manager_policy.is_none());
        assert!(config.feature_gates.is_empty());
        assert_eq!(serde_json::to_string(&config).unwrap(), "{}");
    }

    #[test]
    fn test_serialize_uses_kubelet_keys() {
        let config = KubeletConfiguration {
            cluster_dns: vec!["10.96.0.10".to_string()],
            reserved_system_cpus: Some("0-1".to_string()),
            topology_manager_scope: Some(TopologyManagerScope::Pod),
            ..Default::default()
        };
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["clusterDNS"][0], "10.96.0.10");
        assert_eq!(value["reservedSystemCPUs"], "0-1");
        assert_eq!(value["topologyManagerScope"], "pod");
    }
}
