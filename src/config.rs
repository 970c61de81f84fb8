use crate::adapters::outbound::{whois_client, OwnershipConfig, DEFAULT_RDAP_URL};
use crate::application::{PipelineConfig, DEFAULT_CONCURRENCY};
use crate::domain::value_objects::{CountryCode, CountryCodeError};
use crate::infrastructure::ThrottleConfig;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Run settings
    pub country: Option<CountryCode>,
    pub input_path: String,
    pub geoip_path: String,
    pub workers: usize,
    pub debug: bool,

    // Ownership lookup settings
    pub rdap_url: String,
    pub whois_addr: String,
    pub ownership_timeout_secs: u64,
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
    pub max_qps: Option<f64>,

    // Reverse DNS settings
    pub dns_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            country: None,
            input_path: "affected_ips.txt".to_string(),
            geoip_path: "GeoLite2-City.mmdb".to_string(),
            workers: DEFAULT_CONCURRENCY,
            debug: false,
            rdap_url: DEFAULT_RDAP_URL.to_string(),
            whois_addr: whois_client::DEFAULT_WHOIS_ADDR.to_string(),
            ownership_timeout_secs: 10,
            delay_min_ms: 500,
            delay_max_ms: 2000,
            max_qps: None,
            dns_timeout_secs: 5,
        }
    }
}

impl Config {
    /// Replace the country (e.g. from a command-line argument).
    pub fn with_country(mut self, country: &str) -> Result<Self, ConfigError> {
        self.country = Some(CountryCode::parse(country)?);
        Ok(self)
    }

    /// The target country; only fails if none was configured.
    pub fn target(&self) -> Result<CountryCode, ConfigError> {
        self.country.clone().ok_or(ConfigError::MissingCountry)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.country.is_none() {
            return Err(ConfigError::MissingCountry);
        }
        if self.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.ownership_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("ownership"));
        }
        if self.dns_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("dns"));
        }
        if self.delay_min_ms > self.delay_max_ms {
            return Err(ConfigError::InvertedDelay {
                min: self.delay_min_ms,
                max: self.delay_max_ms,
            });
        }
        if let Some(qps) = self.max_qps {
            if qps.is_nan() || qps <= 0.0 {
                return Err(ConfigError::InvalidQps(qps));
            }
        }
        Ok(())
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            concurrency: self.workers,
        }
    }

    pub fn throttle_config(&self) -> ThrottleConfig {
        ThrottleConfig {
            min_delay: Duration::from_millis(self.delay_min_ms),
            max_delay: Duration::from_millis(self.delay_max_ms),
            max_per_sec: self.max_qps,
            burst_size: 1,
        }
    }

    pub fn ownership_config(&self) -> OwnershipConfig {
        OwnershipConfig {
            rdap_url: self.rdap_url.clone(),
            whois_addr: self.whois_addr.clone(),
            timeout: Duration::from_secs(self.ownership_timeout_secs),
        }
    }

    pub fn dns_timeout(&self) -> Duration {
        Duration::from_secs(self.dns_timeout_secs)
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("target country is required (set GEOENRICH_COUNTRY or pass it as the first argument)")]
    MissingCountry,
    #[error(transparent)]
    Country(#[from] CountryCodeError),
    #[error("worker count must be at least 1")]
    ZeroWorkers,
    #[error("{0} timeout must be at least 1 second")]
    ZeroTimeout(&'static str),
    #[error("delay range is inverted: min {min}ms > max {max}ms")]
    InvertedDelay { min: u64, max: u64 },
    #[error("max queries per second must be positive, got {0}")]
    InvalidQps(f64),
}

/// Load configuration from the process environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(|key| std::env::var(key).ok())
}

/// Load configuration through an arbitrary variable lookup.
pub fn load_config_from<F>(var: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = Config::default();
    let parse_or = |key: &str, default: u64| -> u64 {
        var(key).and_then(|v| v.trim().parse().ok()).unwrap_or(default)
    };

    let country = var("GEOENRICH_COUNTRY")
        .filter(|v| !v.trim().is_empty())
        .map(|v| CountryCode::parse(&v))
        .transpose()?;

    let input_path = var("GEOENRICH_INPUT_PATH").unwrap_or(defaults.input_path);

    let geoip_path = var("GEOENRICH_GEOIP_PATH").unwrap_or(defaults.geoip_path);

    let workers = parse_or("GEOENRICH_WORKERS", defaults.workers as u64) as usize;

    let debug = var("DEBUG").is_some();

    let rdap_url = var("GEOENRICH_RDAP_URL").unwrap_or(defaults.rdap_url);

    let whois_addr = var("GEOENRICH_WHOIS_ADDR").unwrap_or(defaults.whois_addr);

    let ownership_timeout_secs = parse_or(
        "GEOENRICH_OWNERSHIP_TIMEOUT_SECS",
        defaults.ownership_timeout_secs,
    );

    let delay_min_ms = parse_or("GEOENRICH_DELAY_MIN_MS", defaults.delay_min_ms);
    let delay_max_ms = parse_or("GEOENRICH_DELAY_MAX_MS", defaults.delay_max_ms);

    let max_qps = var("GEOENRICH_MAX_QPS").and_then(|v| v.trim().parse().ok());

    let dns_timeout_secs = parse_or("GEOENRICH_DNS_TIMEOUT_SECS", defaults.dns_timeout_secs);

    Ok(Config {
        country,
        input_path,
        geoip_path,
        workers,
        debug,
        rdap_url,
        whois_addr,
        ownership_timeout_secs,
        delay_min_ms,
        delay_max_ms,
        max_qps,
        dns_timeout_secs,
    })
}
