//! Domain Entities - Core business objects
//!
//! These entities represent the records produced while enriching an IP.
//! They have no external dependencies and contain only business logic.

use std::fmt;

/// Placeholder for ownership fields that could not be resolved.
pub const UNKNOWN: &str = "unknown";

/// Placeholder for a hostname that could not be resolved.
pub const UNAVAILABLE: &str = "unavailable";

/// Ownership of an address block, as reported by RDAP/WHOIS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipRecord {
    /// Autonomous system number (digits only, e.g. "15169")
    pub asn: String,
    /// Network block in CIDR notation (e.g. "8.8.8.0/24")
    pub network_block: String,
}

impl OwnershipRecord {
    pub fn new(asn: impl Into<String>, network_block: impl Into<String>) -> Self {
        Self {
            asn: asn.into(),
            network_block: network_block.into(),
        }
    }

    /// Record used when every ownership source failed.
    pub fn unknown() -> Self {
        Self::new(UNKNOWN, UNKNOWN)
    }

    /// Build a record from optional fields, filling gaps with `unknown`.
    pub fn from_parts(asn: Option<String>, network_block: Option<String>) -> Self {
        Self {
            asn: asn.unwrap_or_else(|| UNKNOWN.to_string()),
            network_block: network_block.unwrap_or_else(|| UNKNOWN.to_string()),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.asn == UNKNOWN && self.network_block == UNKNOWN
    }
}

impl Default for OwnershipRecord {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Reverse-DNS name for an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostnameRecord(String);

impl HostnameRecord {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self(hostname.into())
    }

    pub fn unavailable() -> Self {
        Self(UNAVAILABLE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_available(&self) -> bool {
        self.0 != UNAVAILABLE
    }
}

impl fmt::Display for HostnameRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One output row: an address that matched the target country, with
/// everything we learned about it.
///
/// `Display` renders the tab-delimited output line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedResult {
    pub ip: String,
    pub asn: String,
    pub network_block: String,
    pub hostname: String,
}

impl EnrichedResult {
    pub fn new(ip: impl Into<String>, ownership: OwnershipRecord, hostname: HostnameRecord) -> Self {
        Self {
            ip: ip.into(),
            asn: ownership.asn,
            network_block: ownership.network_block,
            hostname: hostname.0,
        }
    }
}

impl fmt::Display for EnrichedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}",
            self.ip, self.asn, self.network_block, self.hostname
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===== OwnershipRecord Tests =====

    #[test]
    fn test_ownership_unknown() {
        let record = OwnershipRecord::unknown();
        assert_eq!(record.asn, "unknown");
        assert_eq!(record.network_block, "unknown");
        assert!(record.is_unknown());
        assert_eq!(OwnershipRecord::default(), record);
    }

    #[test]
    fn test_ownership_from_parts_fills_gaps() {
        let record = OwnershipRecord::from_parts(Some("15169".into()), None);
        assert_eq!(record.asn, "15169");
        assert_eq!(record.network_block, UNKNOWN);
        assert!(!record.is_unknown());

        let record = OwnershipRecord::from_parts(None, Some("8.8.8.0/24".into()));
        assert_eq!(record.asn, UNKNOWN);
        assert_eq!(record.network_block, "8.8.8.0/24");
    }

    // ===== HostnameRecord Tests =====

    #[test]
    fn test_hostname_unavailable() {
        let record = HostnameRecord::unavailable();
        assert_eq!(record.as_str(), "unavailable");
        assert!(!record.is_available());
    }

    #[test]
    fn test_hostname_available() {
        let record = HostnameRecord::new("dns.google");
        assert!(record.is_available());
        assert_eq!(record.to_string(), "dns.google");
    }

    // ===== EnrichedResult Tests =====

    #[test]
    fn test_enriched_result_line_format() {
        let result = EnrichedResult::new(
            "8.8.8.8",
            OwnershipRecord::new("15169", "8.8.8.0/24"),
            HostnameRecord::new("dns.google"),
        );
        assert_eq!(result.to_string(), "8.8.8.8\t15169\t8.8.8.0/24\tdns.google");
    }

    #[test]
    fn test_enriched_result_with_sentinels() {
        let result = EnrichedResult::new(
            "1.2.3.4",
            OwnershipRecord::unknown(),
            HostnameRecord::unavailable(),
        );
        assert_eq!(result.to_string(), "1.2.3.4\tunknown\tunknown\tunavailable");
        assert_eq!(result.to_string().split('\t').count(), 4);
    }
}
