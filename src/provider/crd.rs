//! CRD-backed host provider
//!
//! Hosts for this provider are created and destroyed by an external
//! controller reacting to custom resources. The provider never writes to the
//! cluster; it only finds the Secret the controller published for an instance
//! and reads the address out of it.

use crate::cloud::{
    validate_task_run_id, CloudProvider, CloudVmInstance, InstanceIdentifier, VmState,
};
use crate::config::ProviderConfig;
use crate::k8s::types::{address_of, instance_id_of};
use crate::k8s::{K8sClient, SecretStore};
use crate::metrics::{LookupOutcome, ResolverMetrics};
use crate::{CrdHostError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, error, info, instrument};

pub const PROVIDER_NAME: &str = "crd";
pub const SSH_USER: &str = "crd-user";

pub struct CrdProvider<S> {
    platform: String,
    system_namespace: String,
    store: S,
    metrics: ResolverMetrics,
}

const _: fn() = || {
    fn assert_cloud_provider<T: CloudProvider>() {}
    assert_cloud_provider::<CrdProvider<K8sClient>>();
};

impl<S: SecretStore> CrdProvider<S> {
    pub fn new(
        platform: impl Into<String>,
        system_namespace: impl Into<String>,
        store: S,
        metrics: ResolverMetrics,
    ) -> Self {
        Self {
            platform: platform.into(),
            system_namespace: system_namespace.into(),
            store,
            metrics,
        }
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn system_namespace(&self) -> &str {
        &self.system_namespace
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn metrics(&self) -> &ResolverMetrics {
        &self.metrics
    }

    fn unsupported(operation: &'static str) -> CrdHostError {
        CrdHostError::Unsupported {
            operation,
            provider: PROVIDER_NAME,
        }
    }
}

/// Build a CRD provider from configuration
pub fn create_crd_provider<S: SecretStore>(
    config: &ProviderConfig,
    store: S,
) -> Result<CrdProvider<S>> {
    config.validate()?;
    Ok(CrdProvider::new(
        config.platform.clone(),
        config.system_namespace.clone(),
        store,
        ResolverMetrics::new()?,
    ))
}

#[async_trait]
impl<S: SecretStore> CloudProvider for CrdProvider<S> {
    /// Nothing is launched here; the controller creates the host. The returned
    /// identifier is the key its Secret will be annotated with.
    async fn launch_instance(
        &self,
        task_run_id: &str,
        _instance_tag: &str,
        _additional_instance_tags: &HashMap<String, String>,
    ) -> Result<InstanceIdentifier> {
        validate_task_run_id(task_run_id)?;
        Ok(InstanceIdentifier::new(task_run_id))
    }

    async fn terminate_instance(&self, instance: &InstanceIdentifier) -> Result<()> {
        debug!(instance_id = %instance, "terminate is owned by the provisioning controller");
        Ok(())
    }

    /// Only fails when the host can never become available. A missing Secret,
    /// or a failed list, yields an empty address so the caller keeps polling.
    #[instrument(skip(self, instance_id), fields(instance_id = %instance_id, namespace = %self.system_namespace))]
    async fn get_instance_address(&self, instance_id: &InstanceIdentifier) -> Result<String> {
        if let Err(e) = validate_task_run_id(instance_id.as_str()) {
            self.metrics.record(LookupOutcome::Invalid);
            return Err(e);
        }

        info!("get instance address");

        let secrets = match self.store.list_secrets(&self.system_namespace).await {
            Ok(secrets) => secrets,
            Err(e) => {
                error!(error = %e, "error listing secrets");
                self.metrics.record(LookupOutcome::StoreError);
                return Ok(String::new());
            }
        };

        let address = secrets
            .iter()
            .find(|s| instance_id_of(s) == Some(instance_id.as_str()))
            .and_then(address_of)
            .unwrap_or_default();

        if address.is_empty() {
            debug!(scanned = secrets.len(), "no address published yet");
            self.metrics.record(LookupOutcome::Pending);
        } else {
            info!(address = %address, "instance address resolved");
            self.metrics.record(LookupOutcome::Resolved);
        }

        Ok(address)
    }

    async fn count_instances(&self, _instance_tag: &str) -> Result<usize> {
        Ok(0)
    }

    async fn list_instances(&self, _instance_tag: &str) -> Result<Vec<CloudVmInstance>> {
        Err(Self::unsupported("list_instances"))
    }

    /// There is no state model; callers are told to poll again and own the
    /// retry ceiling.
    async fn get_state(&self, _instance_id: &InstanceIdentifier) -> Result<VmState> {
        Err(CrdHostError::RetryLater {
            state: VmState::Ok,
        })
    }

    async fn clean_up_vms(
        &self,
        _existing_task_runs: &HashMap<String, Vec<String>>,
    ) -> Result<()> {
        Err(Self::unsupported("clean_up_vms"))
    }

    fn ssh_user(&self) -> &str {
        SSH_USER
    }
}
