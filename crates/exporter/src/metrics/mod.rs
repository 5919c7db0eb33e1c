pub mod exporter_metrics;
pub mod exposition;
