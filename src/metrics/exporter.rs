use crate::metrics::collector::ResolverMetrics;
use crate::{CrdHostError, Result};
use prometheus::{Encoder, TextEncoder};

/// Renders resolver metrics in the Prometheus text exposition format
pub struct PrometheusExporter {
    metrics: ResolverMetrics,
}

impl PrometheusExporter {
    pub fn new(metrics: ResolverMetrics) -> Self {
        Self { metrics }
    }

    pub fn format_metrics(&self) -> Result<String> {
        let families = self.metrics.registry().gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&families, &mut buffer)
            .map_err(|e| CrdHostError::MetricsError(e.to_string()))?;

        String::from_utf8(buffer).map_err(|e| CrdHostError::MetricsError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::LookupOutcome;

    #[test]
    fn test_format_includes_recorded_outcomes() {
        let metrics = ResolverMetrics::new().expect("metrics");
        metrics.record(LookupOutcome::Resolved);

        let text = PrometheusExporter::new(metrics)
            .format_metrics()
            .expect("format");

        assert!(text.contains("# TYPE crdhost_address_lookups_total counter"));
        assert!(text.contains("crdhost_address_lookups_total{outcome=\"resolved\"} 1"));
    }
}
