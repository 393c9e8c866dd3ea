use crate::cli::{Commands, OutputFormat};
use crate::cloud::{wait_for_address, CloudProvider, InstanceIdentifier, PollPolicy};
use crate::config::ProviderConfig;
use crate::k8s::{K8sClient, SecretInfo, SecretStore};
use crate::metrics::PrometheusExporter;
use crate::provider::{create_crd_provider, CrdProvider};
use crate::{CrdHostError, Result};
use futures::future::join_all;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, warn};

/// Outcome of resolving one instance, as printed by `resolve`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub instance_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Resolution {
    fn from_result(instance_id: &InstanceIdentifier, result: Result<String>) -> Self {
        let (address, error) = match result {
            Ok(address) if address.is_empty() => (None, None),
            Ok(address) => (Some(address), None),
            Err(e) => (None, Some(e.to_string())),
        };
        Self {
            instance_id: instance_id.to_string(),
            address,
            error,
        }
    }

    fn as_text(&self) -> String {
        match (&self.address, &self.error) {
            (_, Some(e)) => format!("{}\terror: {}", self.instance_id, e),
            (Some(address), None) => format!("{}\t{}", self.instance_id, address),
            (None, None) => format!("{}\t<pending>", self.instance_id),
        }
    }
}

pub async fn handle_command(command: Commands, config: ProviderConfig) -> Result<()> {
    let store = K8sClient::new(config.request_timeout());
    let provider = create_crd_provider(&config, store)?;

    info!(
        platform = provider.platform(),
        namespace = provider.system_namespace(),
        "Using CRD provider"
    );

    match command {
        Commands::Launch { task_run_id, tag } => {
            handle_launch(&provider, &task_run_id, &tag).await
        }
        Commands::Resolve {
            instance_ids,
            output,
        } => handle_resolve(&provider, instance_ids, output).await,
        Commands::Wait {
            instance_id,
            interval_secs,
            max_attempts,
            print_metrics,
        } => {
            let policy = PollPolicy {
                interval: Duration::from_secs(interval_secs),
                max_attempts,
            };
            handle_wait(&provider, instance_id, policy, print_metrics).await
        }
        Commands::State { instance_id } => handle_state(&provider, instance_id).await,
        Commands::SshUser => {
            println!("{}", provider.ssh_user());
            Ok(())
        }
        Commands::List { output } => {
            handle_list(provider.store(), provider.system_namespace(), output).await
        }
    }
}

async fn handle_launch<P: CloudProvider>(
    provider: &P,
    task_run_id: &str,
    tag: &str,
) -> Result<()> {
    let id = provider
        .launch_instance(task_run_id, tag, &HashMap::new())
        .await?;
    println!("{}", id);
    Ok(())
}

/// Resolve every id concurrently, one `Resolution` per id in input order
pub async fn resolve_all<P: CloudProvider + ?Sized>(
    provider: &P,
    instance_ids: Vec<String>,
) -> Vec<Resolution> {
    let ids: Vec<InstanceIdentifier> = instance_ids.into_iter().map(Into::into).collect();

    let results = join_all(ids.iter().map(|id| provider.get_instance_address(id))).await;

    ids.iter()
        .zip(results)
        .map(|(id, result)| Resolution::from_result(id, result))
        .collect()
}

async fn handle_resolve<S: SecretStore>(
    provider: &CrdProvider<S>,
    instance_ids: Vec<String>,
    output: OutputFormat,
) -> Result<()> {
    let resolutions = resolve_all(provider, instance_ids).await;

    match output {
        OutputFormat::Text => {
            for r in &resolutions {
                println!("{}", r.as_text());
            }
        }
        OutputFormat::Json => println!("{}", to_json(&resolutions)?),
    }

    let failed = resolutions.iter().filter(|r| r.error.is_some()).count();
    if failed > 0 {
        return Err(CrdHostError::ResolveFailed {
            failed,
            total: resolutions.len(),
        });
    }
    Ok(())
}

async fn handle_wait<S: SecretStore>(
    provider: &CrdProvider<S>,
    instance_id: String,
    policy: PollPolicy,
    print_metrics: bool,
) -> Result<()> {
    let id = InstanceIdentifier::from(instance_id);
    let result = wait_for_address(provider, &id, policy).await;

    if print_metrics {
        let exporter = PrometheusExporter::new(provider.metrics().clone());
        print!("{}", exporter.format_metrics()?);
    }

    let address = result?;
    println!("{}", address);
    Ok(())
}

async fn handle_state<P: CloudProvider>(provider: &P, instance_id: String) -> Result<()> {
    match provider.get_state(&InstanceIdentifier::from(instance_id)).await {
        Ok(state) => println!("{}", state),
        Err(e) if e.is_retryable() => {
            warn!("provider has no state model");
            println!("retry: {}", e);
        }
        Err(e) => return Err(e),
    }
    Ok(())
}

async fn handle_list<S: SecretStore>(
    store: &S,
    namespace: &str,
    output: OutputFormat,
) -> Result<()> {
    let hosts = host_secrets(store, namespace).await?;

    match output {
        OutputFormat::Text => {
            for host in &hosts {
                println!(
                    "{}\t{}\t{}",
                    host.name,
                    host.instance_id.as_deref().unwrap_or("-"),
                    host.address.as_deref().unwrap_or("<pending>")
                );
            }
        }
        OutputFormat::Json => println!("{}", to_json(&hosts)?),
    }
    Ok(())
}

/// Secrets in `namespace` carrying an instance-id annotation
pub async fn host_secrets<S: SecretStore + ?Sized>(
    store: &S,
    namespace: &str,
) -> Result<Vec<SecretInfo>> {
    let secrets = store.list_secrets(namespace).await?;

    Ok(secrets
        .iter()
        .map(SecretInfo::from_k8s_secret)
        .filter(|info| info.instance_id.is_some())
        .collect())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
