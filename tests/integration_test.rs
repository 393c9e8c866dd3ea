use async_trait::async_trait;
use crdhost::cli::commands::{host_secrets, resolve_all};
use crdhost::cloud::{wait_for_address, CloudProvider, InstanceIdentifier, PollPolicy};
use crdhost::config::ProviderConfig;
use crdhost::error::{CrdHostError, Result};
use crdhost::k8s::{SecretStore, ADDRESS_KEY, INSTANCE_ID_ANNOTATION};
use crdhost::metrics::LookupOutcome;
use crdhost::provider::{create_crd_provider, CrdProvider};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory cluster whose Secrets can appear while a caller is polling
#[derive(Clone, Default)]
struct FakeCluster {
    secrets: Arc<Mutex<Vec<Secret>>>,
    publish_after: Arc<Mutex<Option<(usize, Secret)>>>,
}

impl FakeCluster {
    fn add(&self, secret: Secret) {
        self.secrets.lock().unwrap().push(secret);
    }

    /// Make `secret` visible starting with the `lists`-th list call
    fn publish_after(&self, lists: usize, secret: Secret) {
        *self.publish_after.lock().unwrap() = Some((lists, secret));
    }
}

#[async_trait]
impl SecretStore for FakeCluster {
    async fn list_secrets(&self, namespace: &str) -> Result<Vec<Secret>> {
        let mut pending = self.publish_after.lock().unwrap();
        if let Some((remaining, _)) = pending.as_mut() {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                if let Some((_, secret)) = pending.take() {
                    self.secrets.lock().unwrap().push(secret);
                }
            }
        }

        Ok(self
            .secrets
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.metadata.namespace.as_deref() == Some(namespace))
            .cloned()
            .collect())
    }
}

fn host_secret(namespace: &str, name: &str, instance_id: &str, address: &str) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            annotations: Some(BTreeMap::from([(
                INSTANCE_ID_ANNOTATION.to_string(),
                instance_id.to_string(),
            )])),
            ..Default::default()
        },
        data: Some(BTreeMap::from([(
            ADDRESS_KEY.to_string(),
            ByteString(address.as_bytes().to_vec()),
        )])),
        ..Default::default()
    }
}

fn provider_in(namespace: &str, cluster: FakeCluster) -> CrdProvider<FakeCluster> {
    let config = ProviderConfig {
        system_namespace: namespace.to_string(),
        ..Default::default()
    };
    create_crd_provider(&config, cluster).expect("provider")
}

fn fast_poll(max_attempts: u32) -> PollPolicy {
    PollPolicy {
        interval: Duration::from_millis(1),
        max_attempts,
    }
}

#[test]
fn test_error_types() {
    let err = CrdHostError::Unsupported {
        operation: "list_instances",
        provider: "crd",
    };

    assert!(err.to_string().contains("list_instances"));
    assert!(err.is_unsupported());
    assert!(!err.is_permanent());
}

#[test]
fn test_version_const() {
    assert!(!crdhost::VERSION.is_empty());
}

#[tokio::test]
async fn test_resolves_published_address() {
    let cluster = FakeCluster::default();
    cluster.add(host_secret("ns1", "host-run42", "ns1:run42", "10.0.0.5"));
    let provider = provider_in("ns1", cluster);

    let id = provider
        .launch_instance("ns1:run42", "tag", &HashMap::new())
        .await
        .expect("launch");
    let address = provider.get_instance_address(&id).await.expect("address");

    assert_eq!(address, "10.0.0.5");
}

#[tokio::test]
async fn test_unknown_instance_is_pending_not_error() {
    let cluster = FakeCluster::default();
    cluster.add(host_secret("ns1", "host-run42", "ns1:run42", "10.0.0.5"));
    let provider = provider_in("ns1", cluster);

    let address = provider
        .get_instance_address(&"ns1:run43".into())
        .await
        .expect("pending");

    assert_eq!(address, "");
}

#[tokio::test]
async fn test_malformed_ids_fail_launch_and_lookup() {
    let provider = provider_in("ns1", FakeCluster::default());

    for bad in ["", "run42", "ns1_run42", "a:b:c"] {
        let launch = provider.launch_instance(bad, "tag", &HashMap::new()).await;
        assert!(launch.unwrap_err().is_permanent(), "launch {:?}", bad);

        let lookup = provider.get_instance_address(&bad.into()).await;
        assert!(lookup.unwrap_err().is_permanent(), "lookup {:?}", bad);
    }
}

#[tokio::test]
async fn test_wait_returns_once_secret_appears() {
    let cluster = FakeCluster::default();
    cluster.publish_after(3, host_secret("ns1", "host", "ns1:run42", "10.0.0.7"));
    let provider = provider_in("ns1", cluster);

    let address = wait_for_address(&provider, &"ns1:run42".into(), fast_poll(10))
        .await
        .expect("address");

    assert_eq!(address, "10.0.0.7");
    assert_eq!(provider.metrics().lookups(LookupOutcome::Pending), 2);
    assert_eq!(provider.metrics().lookups(LookupOutcome::Resolved), 1);
}

#[tokio::test]
async fn test_wait_gives_up_after_max_attempts() {
    let provider = provider_in("ns1", FakeCluster::default());

    let err = wait_for_address(&provider, &"ns1:run42".into(), fast_poll(3))
        .await
        .unwrap_err();

    assert!(matches!(err, CrdHostError::WaitExhausted { attempts: 3, .. }));
    assert_eq!(provider.metrics().lookups(LookupOutcome::Pending), 3);
}

#[tokio::test]
async fn test_wait_stops_on_permanent_error() {
    let provider = provider_in("ns1", FakeCluster::default());

    let err = wait_for_address(&provider, &"bogus".into(), fast_poll(100))
        .await
        .unwrap_err();

    assert!(err.is_permanent());
    assert_eq!(provider.metrics().lookups(LookupOutcome::Invalid), 1);
}

#[tokio::test]
async fn test_wait_through_trait_object() {
    let cluster = FakeCluster::default();
    cluster.add(host_secret("ns1", "host", "ns1:run42", "10.0.0.5"));
    let provider: Box<dyn CloudProvider> = Box::new(provider_in("ns1", cluster));

    let address = wait_for_address(provider.as_ref(), &"ns1:run42".into(), fast_poll(1))
        .await
        .expect("address");

    assert_eq!(address, "10.0.0.5");
    assert_eq!(provider.ssh_user(), "crd-user");
}

#[tokio::test]
async fn test_resolve_all_keeps_input_order() {
    let cluster = FakeCluster::default();
    cluster.add(host_secret("ns1", "a", "ns1:a", "10.0.0.1"));
    cluster.add(host_secret("ns1", "c", "ns1:c", "10.0.0.3"));
    let provider = provider_in("ns1", cluster);

    let resolutions = resolve_all(
        &provider,
        vec!["ns1:c".into(), "ns1:b".into(), "bad".into(), "ns1:a".into()],
    )
    .await;

    let summary: Vec<_> = resolutions
        .iter()
        .map(|r| {
            (
                r.instance_id.as_str(),
                r.address.as_deref(),
                r.error.is_some(),
            )
        })
        .collect();

    assert_eq!(
        summary,
        vec![
            ("ns1:c", Some("10.0.0.3"), false),
            ("ns1:b", None, false),
            ("bad", None, true),
            ("ns1:a", Some("10.0.0.1"), false),
        ]
    );
}

#[tokio::test]
async fn test_host_secrets_skips_unannotated() {
    let cluster = FakeCluster::default();
    cluster.add(host_secret("ns1", "host", "ns1:run42", "10.0.0.5"));
    cluster.add(Secret {
        metadata: ObjectMeta {
            name: Some("registry-creds".to_string()),
            namespace: Some("ns1".to_string()),
            ..Default::default()
        },
        ..Default::default()
    });

    let hosts = host_secrets(&cluster, "ns1").await.expect("list");

    assert_eq!(hosts.len(), 1);
    assert_eq!(hosts[0].name, "host");
    assert_eq!(hosts[0].address.as_deref(), Some("10.0.0.5"));
}

#[tokio::test]
async fn test_stubbed_operations() {
    let provider = provider_in("ns1", FakeCluster::default());
    let id = InstanceIdentifier::from("ns1:run42");

    assert!(provider.terminate_instance(&id).await.is_ok());
    assert_eq!(provider.count_instances("tag").await.expect("count"), 0);
    assert!(provider
        .list_instances("tag")
        .await
        .unwrap_err()
        .is_unsupported());
    assert!(provider
        .clean_up_vms(&HashMap::from([(
            "ns1".to_string(),
            vec!["run42".to_string()]
        )]))
        .await
        .unwrap_err()
        .is_unsupported());
    assert!(provider.get_state(&id).await.unwrap_err().is_retryable());
}
