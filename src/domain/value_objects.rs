//! Value Objects - Immutable domain primitives
//!
//! Value objects are identified by their value rather than identity.
//! They are immutable and can be freely shared.

use std::fmt;

/// Country codes (ISO 3166-1 alpha-2) accepted as a filter target.
///
/// The Americas and the Caribbean.
pub const SUPPORTED_COUNTRIES: [&str; 34] = [
    "AG", "AR", "BB", "BZ", "BO", "BR", "CA", "CL", "CO", "CR", "DM", "DO", "EC", "SV", "GD",
    "GT", "GY", "HT", "HN", "JM", "MX", "NI", "PA", "PY", "PE", "KN", "LC", "VC", "SR", "BS",
    "TT", "US", "UY", "VE",
];

/// Target country for a run.
///
/// Always stored upper-case, so comparisons against GeoIP records are exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CountryCode(String);

impl CountryCode {
    /// Parse a country code from user input.
    ///
    /// Input is case-insensitive and surrounding whitespace is ignored.
    ///
    /// # Examples
    /// ```
    /// use geo_enrich::CountryCode;
    ///
    /// assert_eq!(CountryCode::parse("cl").unwrap().as_str(), "CL");
    /// assert!(CountryCode::parse("de").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, CountryCodeError> {
        let code = s.trim().to_uppercase();
        if code.is_empty() {
            return Err(CountryCodeError::Empty);
        }
        if !SUPPORTED_COUNTRIES.contains(&code.as_str()) {
            return Err(CountryCodeError::Unsupported(code));
        }
        Ok(Self(code))
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Exact comparison against an ISO code reported by the GeoIP database.
    pub fn matches(&self, iso_code: &str) -> bool {
        self.0 == iso_code
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CountryCode {
    type Err = CountryCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Country code parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CountryCodeError {
    #[error("country code is empty")]
    Empty,
    #[error("unsupported country code {0} (expected one of {list})", list = SUPPORTED_COUNTRIES.join(", "))]
    Unsupported(String),
}
