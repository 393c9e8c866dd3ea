use crate::Result;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;

/// Read-only view of the Secrets held by the cluster
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn list_secrets(&self, namespace: &str) -> Result<Vec<Secret>>;
}
