//! Capability set shared by every host provider
//!
//! The orchestrator drives all providers through this trait. Return
//! conventions matter as much as the signatures:
//! - `get_instance_address` returns an error only when the address will never
//!   become available; `Ok("")` means "not ready yet, poll again"
//! - operations a provider cannot perform return `CrdHostError::Unsupported`
//!   rather than an empty result

use crate::cloud::{CloudVmInstance, InstanceIdentifier, VmState};
use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;

#[async_trait]
pub trait CloudProvider: Send + Sync {
    async fn launch_instance(
        &self,
        task_run_id: &str,
        instance_tag: &str,
        additional_instance_tags: &HashMap<String, String>,
    ) -> Result<InstanceIdentifier>;

    async fn terminate_instance(&self, instance: &InstanceIdentifier) -> Result<()>;

    async fn get_instance_address(&self, instance_id: &InstanceIdentifier) -> Result<String>;

    async fn count_instances(&self, instance_tag: &str) -> Result<usize>;

    async fn list_instances(&self, instance_tag: &str) -> Result<Vec<CloudVmInstance>>;

    async fn get_state(&self, instance_id: &InstanceIdentifier) -> Result<VmState>;

    /// `existing_task_runs` maps namespace to the TaskRun names still alive
    async fn clean_up_vms(&self, existing_task_runs: &HashMap<String, Vec<String>>)
        -> Result<()>;

    fn ssh_user(&self) -> &str;
}
