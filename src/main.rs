//! geo-enrich - country-filtered IP enrichment
//!
//! This is the composition root that wires together all the components.

use geo_enrich::adapters::inbound::read_ip_list;
use geo_enrich::adapters::outbound::{
    print_summary, HickoryReverseResolver, MaxMindGeoFilter, RdapOwnershipResolver,
    StdoutResultSink,
};
use geo_enrich::infrastructure::shutdown_signal;
use geo_enrich::{load_config, EnrichmentPipeline, QueryThrottle, ShutdownController};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment; first argument overrides the country
    let mut cfg = load_config()?;
    if let Some(country) = std::env::args().nth(1) {
        cfg = cfg.with_country(&country)?;
    }
    cfg.validate()?;
    let target = cfg.target()?;

    // Setup logging (stderr, so stdout carries only records)
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(
        "starting geo-enrich country={} workers={}",
        target,
        cfg.workers
    );

    // ===== COMPOSITION ROOT =====
    // Startup capability check: every collaborator is built once, here.

    // GeoIP filter (MaxMind)
    let geo = match MaxMindGeoFilter::from_file(&cfg.geoip_path) {
        Ok(g) => {
            tracing::info!("GeoIP DB loaded from {} ({})", cfg.geoip_path, g.database_type());
            Arc::new(g)
        }
        Err(e) => {
            tracing::error!("failed to load GeoIP DB from {}: {:?}", cfg.geoip_path, e);
            return Err(e);
        }
    };

    // Ownership resolver (RDAP + WHOIS), throttled
    let throttle = Arc::new(QueryThrottle::new(cfg.throttle_config()));
    let ownership = Arc::new(RdapOwnershipResolver::new(cfg.ownership_config(), throttle)?);

    // Reverse DNS (hickory)
    let reverse = Arc::new(HickoryReverseResolver::from_system_conf(cfg.dns_timeout()));

    // Read input
    tracing::info!("reading ip list from {}", cfg.input_path);
    let ips = read_ip_list(&cfg.input_path)?;
    if ips.is_empty() {
        tracing::warn!("no ips to process in {}", cfg.input_path);
        return Ok(());
    }

    // Cancellation on Ctrl+C / SIGTERM
    let shutdown = ShutdownController::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    let pipeline = EnrichmentPipeline::new(
        geo,
        ownership,
        reverse,
        Arc::new(StdoutResultSink::new()),
        cfg.pipeline_config(),
    )
    .with_shutdown(shutdown);

    let summary = pipeline.run(ips, target).await;
    print_summary(summary.elapsed);

    tracing::info!(
        "{} of {} ips matched ({} processed, {} failed)",
        summary.emitted,
        summary.total,
        summary.processed,
        summary.failed
    );

    if summary.cancelled {
        anyhow::bail!("run cancelled");
    }
    Ok(())
}
