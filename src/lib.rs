//! geo-enrich Library
//!
//! Enriches IP addresses located in a target country with ownership
//! (RDAP/WHOIS) and reverse-DNS data over a bounded worker pool.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use application::{EnrichmentPipeline, PipelineConfig, RunSummary};
pub use config::{load_config, Config, ConfigError};
pub use domain::entities::{EnrichedResult, HostnameRecord, OwnershipRecord};
pub use domain::ports::{GeoFilter, OwnershipResolver, ResultSink, ReverseResolver};
pub use domain::value_objects::CountryCode;
pub use infrastructure::{QueryThrottle, ShutdownController};
