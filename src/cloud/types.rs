use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

/// Opaque handle for the instance serving a TaskRun
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceIdentifier(String);

impl InstanceIdentifier {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstanceIdentifier {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for InstanceIdentifier {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VmState {
    Ok,
    Failed,
}

impl fmt::Display for VmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmState::Ok => f.write_str("OK"),
            VmState::Failed => f.write_str("FAILED"),
        }
    }
}

/// An instance as reported by providers that can enumerate their pool
#[derive(Debug, Clone)]
pub struct CloudVmInstance {
    pub instance_id: InstanceIdentifier,
    pub start_time: SystemTime,
    pub address: String,
}
