//! Stdout Result Sink
//!
//! Writes each record as one tab-delimited line on standard output.

use crate::domain::entities::EnrichedResult;
use crate::domain::ports::ResultSink;
use std::io::Write;

/// Line-per-record sink on stdout.
///
/// The stdout lock is held for the whole line, so concurrent workers never
/// interleave partial records.
#[derive(Debug, Default)]
pub struct StdoutResultSink;

impl StdoutResultSink {
    pub fn new() -> Self {
        Self
    }
}

impl ResultSink for StdoutResultSink {
    fn emit(&self, result: &EnrichedResult) {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        if let Err(e) = writeln!(out, "{}", result).and_then(|_| out.flush()) {
            tracing::error!("failed to write result for {}: {}", result.ip, e);
        }
    }
}

/// Write the trailing summary line.
pub fn print_summary(elapsed: std::time::Duration) {
    println!("{}", format_summary(elapsed));
}

/// Summary line with two-decimal seconds.
pub fn format_summary(elapsed: std::time::Duration) -> String {
    format!("processing complete in {:.2} seconds.", elapsed.as_secs_f64())
}
