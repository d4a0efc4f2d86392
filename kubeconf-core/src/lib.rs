//! Kubeconf Core Library
//!
//! Kubelet configuration model and the I/O-free half of loading it.
//! This crate provides the configuration record, the local file loader,
//! configz payload parsing and the provider abstraction.

pub mod configz;
pub mod error;
pub mod kubelet;
pub mod local;
pub mod provider;

// Re-export common types
pub use configz::{parse_configz, ConfigzEndpoint};
pub use error::KubeletConfigError;
pub use kubelet::{KubeletConfiguration, TopologyManagerPolicy, TopologyManagerScope};
pub use local::{kubelet_config_from_file, kubelet_config_from_yaml, DEFAULT_KUBELET_CONFIG_PATH};
pub use provider::{KubeletConfigProvider, LocalFileProvider};
