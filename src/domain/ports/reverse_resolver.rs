//! Reverse DNS Port

use crate::domain::entities::HostnameRecord;
use async_trait::async_trait;

/// PTR lookup for an IP address.
///
/// Returns [`HostnameRecord::unavailable`] on any failure.
#[async_trait]
pub trait ReverseResolver: Send + Sync {
    async fn resolve(&self, ip: &str) -> HostnameRecord;
}
