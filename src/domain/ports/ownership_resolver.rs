//! Ownership Resolver Port
//!
//! Defines the interface for looking up who owns an address (ASN and network block).

use crate::domain::entities::OwnershipRecord;
use async_trait::async_trait;

/// Registry lookup (RDAP/WHOIS) for an IP address.
///
/// Implementations must be callable concurrently from every worker and
/// must absorb their own failures: a failed lookup yields
/// [`OwnershipRecord::unknown`] (or a partially filled record).
#[async_trait]
pub trait OwnershipResolver: Send + Sync {
    async fn resolve(&self, ip: &str) -> OwnershipRecord;
}
