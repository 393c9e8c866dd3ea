use crate::{CrdHostError, Result};
use prometheus::{IntCounterVec, Opts, Registry};

/// How a single address lookup ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    Resolved,
    Pending,
    Invalid,
    StoreError,
}

impl LookupOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupOutcome::Resolved => "resolved",
            LookupOutcome::Pending => "pending",
            LookupOutcome::Invalid => "invalid",
            LookupOutcome::StoreError => "store_error",
        }
    }
}

/// Counters for address lookups, registered on a private registry
#[derive(Clone)]
pub struct ResolverMetrics {
    registry: Registry,
    lookups: IntCounterVec,
}

impl ResolverMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let lookups = IntCounterVec::new(
            Opts::new(
                "crdhost_address_lookups_total",
                "Instance address lookups by outcome",
            ),
            &["outcome"],
        )
        .map_err(|e| CrdHostError::MetricsError(e.to_string()))?;

        registry
            .register(Box::new(lookups.clone()))
            .map_err(|e| CrdHostError::MetricsError(e.to_string()))?;

        Ok(Self { registry, lookups })
    }

    pub fn record(&self, outcome: LookupOutcome) {
        self.lookups.with_label_values(&[outcome.as_str()]).inc();
    }

    pub fn lookups(&self, outcome: LookupOutcome) -> u64 {
        self.lookups.with_label_values(&[outcome.as_str()]).get()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
