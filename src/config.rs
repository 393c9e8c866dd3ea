//! Provider configuration
//!
//! Loaded from an optional YAML file; command-line flags override file values.

use crate::cloud::task_run::validate_dns_label;
use crate::{CrdHostError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_PLATFORM: &str = "linux/amd64";
pub const DEFAULT_SYSTEM_NAMESPACE: &str = "multi-platform-controller";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProviderConfig {
    pub platform: String,
    /// Namespace the provisioning controller writes host Secrets into
    pub system_namespace: String,
    pub request_timeout_secs: u64,
    /// Free-form provider settings, passed through untouched
    pub config: HashMap<String, String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            platform: DEFAULT_PLATFORM.to_string(),
            system_namespace: DEFAULT_SYSTEM_NAMESPACE.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            config: HashMap::new(),
        }
    }
}

impl ProviderConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| CrdHostError::ConfigError(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml).map_err(|e| match e {
            CrdHostError::ConfigError(msg) => {
                CrdHostError::ConfigError(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Apply command-line overrides, then re-validate
    pub fn with_overrides(
        mut self,
        platform: Option<String>,
        system_namespace: Option<String>,
    ) -> Result<Self> {
        if let Some(platform) = platform {
            self.platform = platform;
        }
        if let Some(ns) = system_namespace {
            self.system_namespace = ns;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.platform.is_empty() {
            return Err(CrdHostError::ConfigError(
                "platform must not be empty".to_string(),
            ));
        }
        validate_dns_label(&self.system_namespace).map_err(|e| {
            CrdHostError::ConfigError(format!(
                "systemNamespace {:?} {}",
                self.system_namespace, e
            ))
        })?;
        if self.request_timeout_secs == 0 {
            return Err(CrdHostError::ConfigError(
                "requestTimeoutSecs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
