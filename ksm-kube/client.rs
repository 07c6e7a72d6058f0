use kube::api::{ApiResource, DynamicObject};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config};
use std::path::Path;

/// Possible errors from building kubernetes client.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// Failed to process kube configuration file.
    #[error("failed to process kube configuration: {0}")]
    KubeconfigError(#[from] kube::config::KubeconfigError),

    /// Failed to infer in-cluster or local configuration.
    #[error("failed to infer kubernetes configuration: {0}")]
    InferConfigError(#[from] kube::config::InferConfigError),

    /// Failed to build kubernetes client.
    #[error("failed to build kubernetes client: {0}")]
    KubeError(#[from] kube::Error),
}

/// Wrapper for the kubernetes [`Client`].
#[derive(Clone)]
pub struct KubernetesClient {
    client: Client,
}

impl KubernetesClient {
    /// Creates new [`KubernetesClient`] instance.\
    /// If `kubeconfig` is not provided, in-cluster configuration (or the default kubeconfig) is used.
    /// `apiserver` overrides the cluster URL from the configuration.
    pub async fn new(kubeconfig: Option<&Path>, apiserver: Option<&str>) -> Result<Self, ClientError> {
        let mut config = match kubeconfig {
            Some(path) => {
                let kubeconfig = Kubeconfig::read_from(path)?;
                Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?
            },
            None => Config::infer().await?,
        };

        if let Some(apiserver) = apiserver {
            config.cluster_url = apiserver
                .parse()
                .map_err(kube::config::KubeconfigError::ParseClusterUrl)?;
        }

        let client = Client::try_from(config)?;
        let k8s_version = client.apiserver_version().await?.git_version;
        tracing::info!("Connected to the Kubernetes API server {k8s_version}");

        Ok(Self { client })
    }

    /// Returns cloned kubernetes client that can be consumed.
    pub fn get_client(&self) -> Client {
        self.client.clone()
    }
}

/// Gets dynamic api client for given `resource` and `namespace`.\
/// **Note** that cluster scoped resources and `None` namespace result in an all-namespaces api.
pub fn get_dynamic_api(ar: &ApiResource, client: Client, namespaced: bool, ns: Option<&str>) -> Api<DynamicObject> {
    match ns {
        Some(namespace) if namespaced && !namespace.is_empty() => Api::namespaced_with(client, namespace, ar),
        _ => Api::all_with(client, ar),
    }
}
