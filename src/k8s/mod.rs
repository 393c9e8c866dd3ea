pub mod client;
pub mod store;
pub mod types;

pub use client::K8sClient;
pub use store::SecretStore;
pub use types::{SecretInfo, ADDRESS_KEY, INSTANCE_ID_ANNOTATION};
