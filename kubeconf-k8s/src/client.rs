//! Kubernetes Client wrapper
//!
//! Resolves credentials and reads a node's configz through the API server proxy.

use std::fmt;
use std::path::Path;

use anyhow::{bail, Context, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tracing::{debug, info};

use kubeconf_core::{parse_configz, KubeletConfiguration};

/// Resolve API server credentials
///
/// In-cluster service account credentials win; outside a cluster the
/// kubeconfig at `kubeconfig_path` is used. An empty path falls back to
/// the standard `KUBECONFIG` / `~/.kube/config` lookup.
pub async fn resolve_client_config(kubeconfig_path: &Path) -> Result<Config> {
    select_config(Config::incluster(), kubeconfig_path).await
}

/// Pick in-cluster credentials if present, else load the kubeconfig
async fn select_config<E: fmt::Display>(
    incluster: std::result::Result<Config, E>,
    kubeconfig_path: &Path,
) -> Result<Config> {
    match incluster {
        Ok(config) => {
            debug!("Using in-cluster Kubernetes config");
            return Ok(config);
        }
        Err(e) => debug!(error = %e, "Not running in a cluster, using kubeconfig"),
    }

    if kubeconfig_path.as_os_str().is_empty() {
        return Config::infer()
            .await
            .context("Failed to infer Kubernetes config");
    }

    let kubeconfig = Kubeconfig::read_from(kubeconfig_path)
        .with_context(|| format!("Failed to read kubeconfig: {:?}", kubeconfig_path))?;
    Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .with_context(|| format!("Failed to load kubeconfig: {:?}", kubeconfig_path))
}

/// Kubernetes client wrapper
pub struct K8sClient {
    client: Client,
}

impl K8sClient {
    /// Create a new K8s client, in-cluster first, else from the given kubeconfig
    pub async fn new(kubeconfig_path: impl AsRef<Path>) -> Result<Self> {
        let config = resolve_client_config(kubeconfig_path.as_ref()).await?;
        let client = Self::with_config(config)?;

        info!("Connected to Kubernetes API server");
        Ok(client)
    }

    /// Create a new K8s client with custom config
    pub fn with_config(config: Config) -> Result<Self> {
        let client = Client::try_from(config)
            .context("Failed to create Kubernetes client from config")?;

        Ok(Self { client })
    }

    /// Wrap an already constructed kube client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetch the raw configz document of a node
    ///
    /// Same as `GET /api/v1/nodes/{node}/proxy/configz` against the API server.
    pub async fn configz(&self, node_name: &str) -> Result<String> {
        validate_node_name(node_name)?;

        let request = http::Request::get(configz_path(node_name))
            .body(Vec::new())
            .context("Failed to build configz request")?;

        debug!(node = node_name, "Requesting kubelet configz");
        self.client
            .request_text(request)
            .await
            .context("failed to get info from node")
    }

    /// Read a node's kubelet config through configz
    ///
    /// Only the topology manager policy is populated.
    pub async fn kubelet_config(&self, node_name: &str) -> Result<KubeletConfiguration> {
        let body = self.configz(node_name).await?;
        let config = parse_configz(body.as_bytes())?;

        info!(
            node = node_name,
            topology_manager_policy = ?config.topology_manager_policy,
            "Loaded kubelet config from configz"
        );
        Ok(config)
    }
}

fn configz_path(node_name: &str) -> String {
    format!("/api/v1/nodes/{}/proxy/configz", node_name)
}

fn validate_node_name(node_name: &str) -> Result<()> {
    if node_name.trim().is_empty() {
        bail!("node name must not be empty");
    }
    if node_name.contains('/') {
        bail!("invalid node name: {}", node_name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::{Body, Request, Response, StatusCode};
    use kubeconf_core::{KubeletConfigError, TopologyManagerPolicy};

    const CONFIGZ: &str = r#"{"kubeletconfig":{"maxPods":110,"topologyManagerPolicy":"restricted"}}"#;

    fn mock_client() -> (
        K8sClient,
        tower_test::mock::Handle<Request<Body>, Response<Body>>,
    ) {
        let (service, handle) = tower_test::mock::pair::<Request<Body>, Response<Body>>();
        (K8sClient::from_client(Client::new(service, "default")), handle)
    }

    #[test]
    fn test_configz_path() {
        assert_eq!(
            configz_path("worker-0"),
            "/api/v1/nodes/worker-0/proxy/configz"
        );
    }

    #[test]
    fn test_validate_node_name() {
        assert!(validate_node_name("worker-0").is_ok());
        assert!(validate_node_name("").is_err());
        assert!(validate_node_name("  ").is_err());
        assert!(validate_node_name("a/b").is_err());
    }

    #[tokio::test]
    async fn test_kubelet_config_from_configz() {
        let (client, mut handle) = mock_client();

        let server = tokio::spawn(async move {
            let (request, send) = handle.next_request().await.expect("service not called");
            assert_eq!(request.method(), &http::Method::GET);
            assert_eq!(request.uri().path(), "/api/v1/nodes/worker-0/proxy/configz");
            send.send_response(Response::builder().body(Body::from(CONFIGZ)).unwrap());
        });

        let config = client.kubelet_config("worker-0").await.unwrap();
        server.await.unwrap();

        assert_eq!(
            config,
            KubeletConfiguration::with_topology_manager_policy(Some(
                TopologyManagerPolicy::Restricted
            ))
        );
        assert!(config.max_pods.is_none());
    }

    #[tokio::test]
    async fn test_api_failure_is_wrapped() {
        let (client, mut handle) = mock_client();

        let server = tokio::spawn(async move {
            let (_request, send) = handle.next_request().await.expect("service not called");
            send.send_response(
                Response::builder()
                    .status(StatusCode::SERVICE_UNAVAILABLE)
                    .body(Body::from("node proxy unavailable"))
                    .unwrap(),
            );
        });

        let err = client.kubelet_config("worker-0").await.unwrap_err();
        server.await.unwrap();

        assert_eq!(err.to_string(), "failed to get info from node");
    }

    #[tokio::test]
    async fn test_malformed_configz_is_parse_error() {
        let (client, mut handle) = mock_client();

        let server = tokio::spawn(async move {
            let (_request, send) = handle.next_request().await.expect("service not called");
            send.send_response(Response::builder().body(Body::from("not json")).unwrap());
        });

        let err = client.kubelet_config("worker-0").await.unwrap_err();
        server.await.unwrap();

        let err = err.downcast_ref::<KubeletConfigError>().unwrap();
        assert!(err.is_parse());
    }

    #[tokio::test]
    async fn test_empty_node_name_sends_no_request() {
        let (client, _handle) = mock_client();
        let err = client.kubelet_config("").await.unwrap_err();
        assert!(err.to_string().contains("node name"));
    }

    const KUBECONFIG: &str = r#"
apiVersion: v1
kind: Config
clusters:
- name: test
  cluster:
    server: https://10.0.0.1:6443
    insecure-skip-tls-verify: true
contexts:
- name: test
  context:
    cluster: test
    user: test
current-context: test
users:
- name: test
  user:
    token: test-token
"#;

    fn not_in_cluster() -> std::result::Result<Config, &'static str> {
        Err("not running in a cluster")
    }

    fn write_kubeconfig(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("kubeconfig");
        std::fs::write(&path, KUBECONFIG).unwrap();
        path
    }

    #[tokio::test]
    async fn test_select_kubeconfig_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_kubeconfig(&dir);

        let config = select_config(not_in_cluster(), &path).await.unwrap();
        assert_eq!(config.cluster_url.host(), Some("10.0.0.1"));
        assert_eq!(config.cluster_url.port_u16(), Some(6443));
    }

    #[tokio::test]
    async fn test_incluster_config_wins_over_kubeconfig() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_kubeconfig(&dir);

        let incluster = Config::new("https://10.96.0.1:443".parse().unwrap());
        let config = select_config(Ok::<_, &str>(incluster), &path).await.unwrap();
        assert_eq!(config.cluster_url.host(), Some("10.96.0.1"));
        assert_eq!(config.cluster_url.port_u16(), Some(443));
    }

    #[tokio::test]
    async fn test_empty_path_infers_from_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_kubeconfig(&dir);
        std::env::set_var("KUBECONFIG", &path);

        let config = select_config(not_in_cluster(), Path::new("")).await.unwrap();
        assert_eq!(config.cluster_url.host(), Some("10.0.0.1"));
    }

    #[tokio::test]
    async fn test_missing_kubeconfig_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = select_config(not_in_cluster(), &dir.path().join("missing"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read kubeconfig"));
    }
}
