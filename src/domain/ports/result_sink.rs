//! Result Sink Port
//!
//! Destination for enriched records.

use crate::domain::entities::EnrichedResult;

/// Receives one record per matching IP.
///
/// Called concurrently by pipeline workers; each call must write the
/// whole record atomically.
pub trait ResultSink: Send + Sync {
    fn emit(&self, result: &EnrichedResult);
}
