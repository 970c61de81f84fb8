//! Application layer: the enrichment use case.

pub mod enrichment_pipeline;

pub use enrichment_pipeline::{EnrichmentPipeline, PipelineConfig, RunSummary, DEFAULT_CONCURRENCY};
