use crate::cloud::VmState;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrdHostError {
    #[error("invalid TaskRun ID {id:?}: {reason}")]
    InvalidTaskRunId { id: String, reason: String },

    #[error("{operation} is not supported by the {provider} provider")]
    Unsupported {
        operation: &'static str,
        provider: &'static str,
    },

    #[error("retry to get the value quickly (last known state: {state})")]
    RetryLater { state: VmState },

    #[error("instance {instance_id} has no address after {attempts} attempts")]
    WaitExhausted { instance_id: String, attempts: u32 },

    #[error("{failed} of {total} instance identifiers could not be resolved")]
    ResolveFailed { failed: usize, total: usize },

    #[error("Kubernetes error: {0}")]
    KubernetesError(String),

    #[error("Metrics error: {0}")]
    MetricsError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Output encoding error: {0}")]
    OutputError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CrdHostError {
    /// Errors after which polling the same identifier can never succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::InvalidTaskRunId { .. })
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RetryLater { .. } | Self::KubernetesError(_))
    }
}

pub type Result<T> = std::result::Result<T, CrdHostError>;
