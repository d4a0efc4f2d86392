//! Error types for kubelet configuration loading

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or parsing a kubelet configuration
#[derive(Debug, Error)]
pub enum KubeletConfigError {
    /// The configuration file could not be read
    #[error("Failed to read kubelet config {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not a valid kubelet configuration
    #[error("Failed to parse kubelet config")]
    Yaml(#[from] serde_yaml::Error),

    /// The configz payload returned by the node is malformed
    #[error("Failed to parse configz response")]
    Configz(#[from] serde_json::Error),
}

impl KubeletConfigError {
    /// Whether this error came from reading rather than parsing
    pub fn is_io(&self) -> bool {
        matches!(self, KubeletConfigError::Io { .. })
    }

    /// Whether this error came from a malformed document
    pub fn is_parse(&self) -> bool {
        matches!(
            self,
            KubeletConfigError::Yaml(_) | KubeletConfigError::Configz(_)
        )
    }
}
