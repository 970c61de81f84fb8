//! Hickory Reverse DNS Resolver
//!
//! Implements ReverseResolver with PTR lookups through hickory-resolver.

use crate::domain::entities::HostnameRecord;
use crate::domain::ports::ReverseResolver;
use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use std::net::IpAddr;
use std::time::Duration;
use tokio::time::timeout;

/// PTR resolver shared by all workers.
///
/// The underlying resolver is built once; each lookup gets its own timeout.
pub struct HickoryReverseResolver {
    resolver: TokioAsyncResolver,
    timeout: Duration,
}

impl HickoryReverseResolver {
    /// Build from the system resolver configuration (`/etc/resolv.conf`),
    /// falling back to the library's default upstreams.
    pub fn from_system_conf(lookup_timeout: Duration) -> Self {
        let resolver = match TokioAsyncResolver::tokio_from_system_conf() {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("system DNS config unusable ({}), using defaults", e);
                TokioAsyncResolver::tokio(ResolverConfig::default(), Self::options(lookup_timeout))
            }
        };
        Self {
            resolver,
            timeout: lookup_timeout,
        }
    }

    /// Build from an explicit configuration.
    pub fn with_config(config: ResolverConfig, lookup_timeout: Duration) -> Self {
        Self {
            resolver: TokioAsyncResolver::tokio(config, Self::options(lookup_timeout)),
            timeout: lookup_timeout,
        }
    }

    fn options(lookup_timeout: Duration) -> ResolverOpts {
        let mut opts = ResolverOpts::default();
        opts.timeout = lookup_timeout;
        opts.attempts = 1;
        opts
    }

    /// First PTR name for `ip`, without the trailing dot.
    pub async fn lookup(&self, ip: &str) -> anyhow::Result<String> {
        let addr: IpAddr = ip
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("malformed address {:?}", ip))?;

        let resp = timeout(self.timeout, self.resolver.reverse_lookup(addr))
            .await
            .map_err(|_| anyhow::anyhow!("timed out after {:?}", self.timeout))??;

        resp.iter()
            .next()
            .map(|name| trim_root(&name.to_utf8()))
            .ok_or_else(|| anyhow::anyhow!("no PTR record"))
    }
}

#[async_trait]
impl ReverseResolver for HickoryReverseResolver {
    async fn resolve(&self, ip: &str) -> HostnameRecord {
        match self.lookup(ip).await {
            Ok(name) => HostnameRecord::new(name),
            Err(e) => {
                tracing::debug!("reverse dns failed for {}: {}", ip, e);
                HostnameRecord::unavailable()
            }
        }
    }
}

fn trim_root(name: &str) -> String {
    name.strip_suffix('.').unwrap_or(name).to_string()
}
