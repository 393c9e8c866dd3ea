pub mod collector;
pub mod exporter;

pub use collector::{LookupOutcome, ResolverMetrics};
pub use exporter::PrometheusExporter;
