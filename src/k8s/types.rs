use k8s_openapi::api::core::v1::Secret;
use serde::{Deserialize, Serialize};

/// Annotation the provisioning controller sets to the instance identifier
pub const INSTANCE_ID_ANNOTATION: &str = "mpc.konflux-ci.dev/instance-id";

/// Secret data key holding the host address
pub const ADDRESS_KEY: &str = "address";

/// The parts of a host Secret the resolver cares about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretInfo {
    pub name: String,
    pub namespace: String,
    pub instance_id: Option<String>,
    pub address: Option<String>,
}

impl SecretInfo {
    pub fn from_k8s_secret(secret: &Secret) -> Self {
        let metadata = &secret.metadata;

        Self {
            name: metadata.name.clone().unwrap_or_default(),
            namespace: metadata.namespace.clone().unwrap_or_default(),
            instance_id: instance_id_of(secret).map(str::to_string),
            address: address_of(secret),
        }
    }
}

pub fn instance_id_of(secret: &Secret) -> Option<&str> {
    secret
        .metadata
        .annotations
        .as_ref()
        .and_then(|a| a.get(INSTANCE_ID_ANNOTATION))
        .map(String::as_str)
}

/// Address bytes are not guaranteed to be UTF-8; invalid sequences are replaced.
pub fn address_of(secret: &Secret) -> Option<String> {
    secret
        .data
        .as_ref()
        .and_then(|d| d.get(ADDRESS_KEY))
        .map(|bytes| String::from_utf8_lossy(&bytes.0).into_owned())
}
