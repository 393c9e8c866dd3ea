use crate::k8s::SecretStore;
use crate::{CrdHostError, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::api::ListParams;
use kube::{Api, Client, Config};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Read-only Kubernetes client used by the CRD provider.
///
/// The connection is established on first use, so commands that never touch
/// the cluster work without a kubeconfig.
pub struct K8sClient {
    client: OnceCell<Client>,
    request_timeout: Duration,
}

impl K8sClient {
    /// `request_timeout` bounds connecting and reading, so a stalled API
    /// server surfaces as an error instead of blocking the caller.
    pub fn new(request_timeout: Duration) -> Self {
        Self {
            client: OnceCell::new(),
            request_timeout,
        }
    }

    async fn client(&self) -> Result<&Client> {
        self.client
            .get_or_try_init(|| Self::connect(self.request_timeout))
            .await
    }

    async fn connect(request_timeout: Duration) -> Result<Client> {
        debug!("Initializing Kubernetes client");

        let mut config = Config::infer().await.map_err(|e| {
            CrdHostError::KubernetesError(format!("Failed to infer K8s config: {}", e))
        })?;
        config.connect_timeout = Some(request_timeout);
        config.read_timeout = Some(request_timeout);

        let client = Client::try_from(config).map_err(|e| {
            CrdHostError::KubernetesError(format!("Failed to create K8s client: {}", e))
        })?;

        info!("Successfully connected to Kubernetes cluster");

        Ok(client)
    }
}

#[async_trait]
impl SecretStore for K8sClient {
    async fn list_secrets(&self, namespace: &str) -> Result<Vec<Secret>> {
        let secrets: Api<Secret> = Api::namespaced(self.client().await?.clone(), namespace);

        let secret_list = secrets.list(&ListParams::default()).await.map_err(|e| {
            CrdHostError::KubernetesError(format!(
                "Failed to list secrets in {}: {}",
                namespace, e
            ))
        })?;

        Ok(secret_list.items)
    }
}
