//! Enrichment Pipeline - Main application use case
//!
//! Fans a list of IPs out over a fixed pool of workers. Each IP goes
//! through geo filter → ownership lookup → reverse DNS, strictly in that
//! order, and produces at most one record.

use crate::domain::entities::EnrichedResult;
use crate::domain::ports::{GeoFilter, OwnershipResolver, ResultSink, ReverseResolver};
use crate::domain::value_objects::CountryCode;
use crate::infrastructure::ShutdownController;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default worker pool size.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Number of workers pulling IPs in parallel
    pub concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Outcome of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// IPs handed to the run
    pub total: usize,
    /// IPs whose stages all finished (matched or not)
    pub processed: usize,
    /// Records emitted to the sink
    pub emitted: usize,
    /// IPs whose enrichment task panicked; nothing was emitted for them
    pub failed: usize,
    /// Wall-clock time until every worker was joined
    pub elapsed: Duration,
    /// Whether the run was stopped by the shutdown controller
    pub cancelled: bool,
}

/// The lookup stages, shared by every worker.
struct Stages {
    geo: Arc<dyn GeoFilter>,
    ownership: Arc<dyn OwnershipResolver>,
    reverse: Arc<dyn ReverseResolver>,
}

impl Stages {
    async fn enrich(&self, ip: &str, target: &CountryCode) -> Option<EnrichedResult> {
        if !self.geo.matches(ip, target) {
            return None;
        }
        let ownership = self.ownership.resolve(ip).await;
        let hostname = self.reverse.resolve(ip).await;
        Some(EnrichedResult::new(ip, ownership, hostname))
    }
}

/// State handed to each spawned worker.
#[derive(Clone)]
struct Worker {
    stages: Arc<Stages>,
    sink: Arc<dyn ResultSink>,
    shutdown: ShutdownController,
    ips: Arc<[String]>,
    target: CountryCode,
    cursor: Arc<AtomicUsize>,
    processed: Arc<AtomicUsize>,
    emitted: Arc<AtomicUsize>,
    failed: Arc<AtomicUsize>,
}

impl Worker {
    async fn run(self, id: usize) {
        loop {
            if self.shutdown.is_shutdown() {
                break;
            }
            let idx = self.cursor.fetch_add(1, Ordering::SeqCst);
            let Some(ip) = self.ips.get(idx) else {
                break;
            };

            let _guard = self.shutdown.in_flight_guard();

            // Each IP runs in its own task so a panicking port only loses that IP.
            let stages = self.stages.clone();
            let target = self.target.clone();
            let owned_ip = ip.clone();
            let mut task = tokio::spawn(async move { stages.enrich(&owned_ip, &target).await });

            let joined = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => None,
                joined = &mut task => Some(joined),
            };
            let outcome = match joined {
                None => {
                    task.abort();
                    tracing::debug!("worker {} abandoned {}", id, ip);
                    break;
                }
                Some(Ok(outcome)) => outcome,
                Some(Err(e)) => {
                    tracing::error!("enrichment of {} failed: {}", ip, e);
                    self.failed.fetch_add(1, Ordering::SeqCst);
                    continue;
                }
            };

            if let Some(result) = outcome {
                self.sink.emit(&result);
                self.emitted.fetch_add(1, Ordering::SeqCst);
            }
            self.processed.fetch_add(1, Ordering::SeqCst);
        }
        tracing::trace!("worker {} done", id);
    }
}

/// Enrichment pipeline - main application use case.
///
/// Emission order across IPs is whatever order workers finish in.
pub struct EnrichmentPipeline {
    stages: Arc<Stages>,
    sink: Arc<dyn ResultSink>,
    config: PipelineConfig,
    shutdown: ShutdownController,
}

impl EnrichmentPipeline {
    /// Create a new pipeline.
    pub fn new(
        geo: Arc<dyn GeoFilter>,
        ownership: Arc<dyn OwnershipResolver>,
        reverse: Arc<dyn ReverseResolver>,
        sink: Arc<dyn ResultSink>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            stages: Arc::new(Stages {
                geo,
                ownership,
                reverse,
            }),
            sink,
            config,
            shutdown: ShutdownController::new(),
        }
    }

    /// Use an externally owned shutdown controller (e.g. wired to signals).
    pub fn with_shutdown(mut self, shutdown: ShutdownController) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn shutdown_controller(&self) -> ShutdownController {
        self.shutdown.clone()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Enrich a single IP without emitting it.
    ///
    /// Returns None when the IP is not in `target`.
    pub async fn enrich(&self, ip: &str, target: &CountryCode) -> Option<EnrichedResult> {
        self.stages.enrich(ip, target).await
    }

    /// Process every IP and emit one record per IP located in `target`.
    ///
    /// Spawns `min(concurrency, ips.len())` workers and returns once all of
    /// them have been joined.
    pub async fn run(&self, ips: Vec<String>, target: CountryCode) -> RunSummary {
        let total = ips.len();
        let worker_count = self.config.concurrency.max(1).min(total);
        let ips: Arc<[String]> = ips.into();

        let worker = Worker {
            stages: self.stages.clone(),
            sink: self.sink.clone(),
            shutdown: self.shutdown.clone(),
            ips,
            target,
            cursor: Arc::new(AtomicUsize::new(0)),
            processed: Arc::new(AtomicUsize::new(0)),
            emitted: Arc::new(AtomicUsize::new(0)),
            failed: Arc::new(AtomicUsize::new(0)),
        };

        tracing::info!(
            "processing {} ips for {} with {} workers",
            total,
            worker.target,
            worker_count
        );

        let start = Instant::now();
        let handles: Vec<_> = (0..worker_count)
            .map(|id| tokio::spawn(worker.clone().run(id)))
            .collect();

        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!("enrichment worker failed: {}", e);
            }
        }
        let elapsed = start.elapsed();

        let summary = RunSummary {
            total,
            processed: worker.processed.load(Ordering::SeqCst),
            emitted: worker.emitted.load(Ordering::SeqCst),
            failed: worker.failed.load(Ordering::SeqCst),
            elapsed,
            cancelled: self.shutdown.is_shutdown(),
        };

        if summary.cancelled {
            tracing::warn!(
                "run cancelled after {}/{} ips ({} emitted)",
                summary.processed,
                summary.total,
                summary.emitted
            );
        } else {
            if summary.failed > 0 {
                tracing::warn!("{} ips failed during enrichment", summary.failed);
            }
            tracing::debug!(
                "run finished: {} ips, {} emitted in {:?}",
                summary.total,
                summary.emitted,
                summary.elapsed
            );
        }

        summary
    }
}
