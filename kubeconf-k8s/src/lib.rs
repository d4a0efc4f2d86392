//! Kubeconf Kubernetes Integration
//!
//! Provides the Kubernetes client and the configz-based kubelet config loader.

pub mod client;
pub mod kubelet_api;

pub use client::{resolve_client_config, K8sClient};
pub use kubelet_api::{kubelet_config_from_kubelet_api, KubeletApiProvider};
