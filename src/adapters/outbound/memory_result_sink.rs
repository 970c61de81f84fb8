//! In-memory Result Sink
//!
//! Collects records instead of printing them. Used by tests and by callers
//! embedding the pipeline as a library.

use crate::domain::entities::EnrichedResult;
use crate::domain::ports::ResultSink;
use parking_lot::Mutex;

#[derive(Debug, Default)]
pub struct MemoryResultSink {
    results: Mutex<Vec<EnrichedResult>>,
}

impl MemoryResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far, in emission order.
    pub fn results(&self) -> Vec<EnrichedResult> {
        self.results.lock().clone()
    }

    /// Emitted IPs, sorted.
    pub fn ips(&self) -> Vec<String> {
        let mut ips: Vec<String> = self.results.lock().iter().map(|r| r.ip.clone()).collect();
        ips.sort();
        ips
    }

    pub fn len(&self) -> usize {
        self.results.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.lock().is_empty()
    }
}

impl ResultSink for MemoryResultSink {
    fn emit(&self, result: &EnrichedResult) {
        self.results.lock().push(result.clone());
    }
}
