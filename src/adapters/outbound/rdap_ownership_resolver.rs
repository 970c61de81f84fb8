//! RDAP Ownership Resolver
//!
//! Implements OwnershipResolver with an RDAP query, falling back to a
//! Team Cymru style WHOIS lookup when RDAP did not give both fields.
//! When the fallback runs, its announced ASN and BGP prefix take precedence
//! so the two columns come from the same source; RDAP only fills gaps.
//!
//! See: RFC 9083 (RDAP responses) and the `cidr0` / ARIN `originas0`
//! extensions for CIDR blocks and origin ASNs.

use crate::adapters::outbound::whois_client;
use crate::domain::entities::OwnershipRecord;
use crate::domain::ports::OwnershipResolver;
use crate::infrastructure::QueryThrottle;
use async_trait::async_trait;
use serde::Deserialize;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

/// Default RDAP bootstrap service (redirects to the responsible RIR).
pub const DEFAULT_RDAP_URL: &str = "https://rdap.org";

/// Configuration for ownership lookups.
#[derive(Debug, Clone)]
pub struct OwnershipConfig {
    /// Base URL of the RDAP service; queries go to `{rdap_url}/ip/{ip}`
    pub rdap_url: String,
    /// WHOIS fallback endpoint ("host:port")
    pub whois_addr: String,
    /// Per-request timeout for each source
    pub timeout: Duration,
}

impl Default for OwnershipConfig {
    fn default() -> Self {
        Self {
            rdap_url: DEFAULT_RDAP_URL.to_string(),
            whois_addr: whois_client::DEFAULT_WHOIS_ADDR.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// RDAP IP network object (only the fields we read).
#[derive(Debug, Default, Deserialize)]
struct RdapIpNetwork {
    #[serde(default)]
    cidr0_cidrs: Vec<Cidr0>,
    #[serde(default, rename = "arin_originas0_originautnums")]
    origin_autnums: Vec<u64>,
    #[serde(rename = "startAddress")]
    start_address: Option<String>,
    #[serde(rename = "endAddress")]
    end_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Cidr0 {
    v4prefix: Option<String>,
    v6prefix: Option<String>,
    length: Option<u8>,
}

impl RdapIpNetwork {
    fn asn(&self) -> Option<String> {
        self.origin_autnums.first().map(|n| n.to_string())
    }

    /// First CIDR block, or the start-end range when it is exactly one CIDR.
    fn network_block(&self) -> Option<String> {
        let cidr = self.cidr0_cidrs.iter().find_map(|c| {
            let prefix = c.v4prefix.as_ref().or(c.v6prefix.as_ref())?;
            Some(format!("{}/{}", prefix, c.length?))
        });
        cidr.or_else(|| match (&self.start_address, &self.end_address) {
            (Some(start), Some(end)) => range_to_cidr(start, end),
            _ => None,
        })
    }
}

/// `start`..=`end` as a single `prefix/len`, if the range is one aligned block.
fn range_to_cidr(start: &str, end: &str) -> Option<String> {
    let (lo, hi, bits) = match (start.parse::<IpAddr>().ok()?, end.parse::<IpAddr>().ok()?) {
        (IpAddr::V4(a), IpAddr::V4(b)) => (u32::from(a) as u128, u32::from(b) as u128, 32),
        (IpAddr::V6(a), IpAddr::V6(b)) => (u128::from(a), u128::from(b), 128),
        _ => return None,
    };
    if hi < lo {
        return None;
    }
    let host = lo ^ hi;
    let host_bits = host.count_ones();
    let mask = if host_bits == 128 {
        u128::MAX
    } else {
        (1u128 << host_bits) - 1
    };
    if host != mask || lo & host != 0 {
        return None;
    }
    Some(format!("{}/{}", start.trim(), bits - host_bits))
}

/// Partial answer from one source.
#[derive(Debug, Default, Clone, PartialEq)]
struct Partial {
    asn: Option<String>,
    network_block: Option<String>,
}

impl Partial {
    fn is_complete(&self) -> bool {
        self.asn.is_some() && self.network_block.is_some()
    }

    /// Fill our gaps from `other`.
    fn merge(self, other: Partial) -> Partial {
        Partial {
            asn: self.asn.or(other.asn),
            network_block: self.network_block.or(other.network_block),
        }
    }

    fn into_record(self) -> OwnershipRecord {
        OwnershipRecord::from_parts(self.asn, self.network_block)
    }
}

/// RDAP + WHOIS ownership resolver.
///
/// Holds only read-only configuration, a shared HTTP client and the shared
/// query throttle, so one instance serves every worker.
pub struct RdapOwnershipResolver {
    config: OwnershipConfig,
    client: reqwest::Client,
    throttle: Arc<QueryThrottle>,
}

impl RdapOwnershipResolver {
    /// Create a resolver; fails only if the HTTP client cannot be built.
    pub fn new(config: OwnershipConfig, throttle: Arc<QueryThrottle>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("geo-enrich/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            config,
            client,
            throttle,
        })
    }

    pub fn config(&self) -> &OwnershipConfig {
        &self.config
    }

    /// Query RDAP for an address.
    async fn fetch_rdap(client: &reqwest::Client, base_url: &str, ip: &str) -> anyhow::Result<Partial> {
        let url = format!("{}/ip/{}", base_url.trim_end_matches('/'), ip);
        let response = client
            .get(&url)
            .header("accept", "application/rdap+json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            anyhow::bail!("RDAP query failed: {}", status);
        }

        let network: RdapIpNetwork = response.json().await?;
        Ok(Partial {
            asn: network.asn(),
            network_block: network.network_block(),
        })
    }

    /// Query the WHOIS fallback for an address.
    async fn fetch_whois(addr: &str, ip: &str, timeout: Duration) -> anyhow::Result<Partial> {
        let resp = whois_client::query(addr, &whois_client::cymru_query(ip), timeout).await?;
        let (asn, network_block) = whois_client::parse_cymru(&resp);
        if asn.is_none() && network_block.is_none() {
            anyhow::bail!("no ASN data in WHOIS response");
        }
        Ok(Partial { asn, network_block })
    }
}

#[async_trait]
impl OwnershipResolver for RdapOwnershipResolver {
    async fn resolve(&self, ip: &str) -> OwnershipRecord {
        self.throttle.acquire().await;

        let rdap = match Self::fetch_rdap(&self.client, &self.config.rdap_url, ip).await {
            Ok(partial) => partial,
            Err(e) => {
                tracing::warn!("ownership lookup (rdap) failed for {}: {}", ip, e);
                Partial::default()
            }
        };
        if rdap.is_complete() {
            return rdap.into_record();
        }

        tracing::debug!("falling back to whois for {} (rdap gave {:?})", ip, rdap);
        let whois = match Self::fetch_whois(&self.config.whois_addr, ip, self.config.timeout).await {
            Ok(partial) => partial,
            Err(e) => {
                tracing::warn!("ownership lookup (whois) failed for {}: {}", ip, e);
                Partial::default()
            }
        };

        // Announced ASN and prefix travel together; RDAP only fills gaps.
        whois.merge(rdap).into_record()
    }
}
