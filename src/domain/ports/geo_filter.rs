//! GeoIP Filter Port
//!
//! Defines the interface for deciding whether an IP belongs to a country.

use crate::domain::value_objects::CountryCode;

/// Country filter backed by a geolocation database.
///
/// This is an outbound port that abstracts the GeoIP database.
pub trait GeoFilter: Send + Sync {
    /// Whether `ip` geolocates to `target`.
    ///
    /// Any lookup failure counts as "no match"; implementations log the
    /// failure themselves and never return an error.
    fn matches(&self, ip: &str, target: &CountryCode) -> bool;
}
