//! MaxMind GeoIP Filter
//!
//! Implements GeoFilter using a MaxMind GeoLite2 City or Country database.

use crate::domain::ports::GeoFilter;
use crate::domain::value_objects::CountryCode;
use maxminddb::Reader;
use serde::Deserialize;
use std::net::IpAddr;
use std::sync::Arc;

/// Subset of a GeoLite2 record we care about.
///
/// City and Country databases share this shape.
#[derive(Debug, Deserialize)]
struct CountryResp {
    country: Option<Country>,
}

#[derive(Debug, Deserialize)]
struct Country {
    iso_code: Option<String>,
}

impl CountryResp {
    fn iso_code(self) -> Option<String> {
        self.country?.iso_code
    }
}

/// MaxMind GeoIP country filter.
///
/// The reader is opened once and shared by every worker; lookups only
/// read from it.
pub struct MaxMindGeoFilter {
    reader: Arc<Reader<Vec<u8>>>,
}

impl MaxMindGeoFilter {
    /// Load a GeoIP database from a file path.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let reader = Reader::open_readfile(path)?;
        Ok(Self {
            reader: Arc::new(reader),
        })
    }

    /// Load a GeoIP database from raw bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> anyhow::Result<Self> {
        let reader = Reader::from_source(bytes)?;
        Ok(Self {
            reader: Arc::new(reader),
        })
    }

    /// Database type string from the metadata (e.g. "GeoLite2-City").
    pub fn database_type(&self) -> &str {
        &self.reader.metadata.database_type
    }

    /// Resolve the ISO country code for an address.
    pub fn country_of(&self, ip: &str) -> anyhow::Result<String> {
        let addr = parse_ip(ip)?;
        let resp: CountryResp = self.reader.lookup(addr)?;
        resp.iso_code()
            .ok_or_else(|| anyhow::anyhow!("no country in record"))
    }
}

impl GeoFilter for MaxMindGeoFilter {
    fn matches(&self, ip: &str, target: &CountryCode) -> bool {
        match self.country_of(ip) {
            Ok(iso) => target.matches(&iso),
            Err(e) => {
                tracing::warn!("geo lookup failed for {}: {}", ip, e);
                false
            }
        }
    }
}

fn parse_ip(ip: &str) -> anyhow::Result<IpAddr> {
    ip.trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("malformed address {:?}", ip))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use tracing_test::traced_test;

    /// Minimal MaxMind DB writer: IPv4 search tree with 24-bit records.
    mod mmdb {
        use std::net::Ipv4Addr;

        fn ctrl(kind: u8, size: usize) -> Vec<u8> {
            assert!(size < 29, "long fields not supported");
            if kind <= 7 {
                vec![(kind << 5) | size as u8]
            } else {
                vec![size as u8, kind - 7]
            }
        }

        fn uint(kind: u8, value: u64, width: usize) -> Vec<u8> {
            let mut out = ctrl(kind, width);
            out.extend_from_slice(&value.to_be_bytes()[8 - width..]);
            out
        }

        pub fn string(s: &str) -> Vec<u8> {
            let mut out = ctrl(2, s.len());
            out.extend_from_slice(s.as_bytes());
            out
        }

        pub fn map(pairs: &[(&str, Vec<u8>)]) -> Vec<u8> {
            let mut out = ctrl(7, pairs.len());
            for (key, value) in pairs {
                out.extend(string(key));
                out.extend_from_slice(value);
            }
            out
        }

        fn array(items: &[Vec<u8>]) -> Vec<u8> {
            let mut out = ctrl(11, items.len());
            for item in items {
                out.extend_from_slice(item);
            }
            out
        }

        pub fn country(iso: &str) -> Vec<u8> {
            map(&[("country", map(&[("iso_code", string(iso))]))])
        }

        #[derive(Clone, Copy)]
        enum Slot {
            Empty,
            Node(usize),
            Data(usize),
        }

        pub fn build(networks: &[(Ipv4Addr, u32, Vec<u8>)]) -> Vec<u8> {
            let mut data = Vec::new();
            let mut nodes = vec![[Slot::Empty; 2]];

            for (addr, len, record) in networks {
                let offset = data.len();
                data.extend_from_slice(record);

                let bits = u32::from(*addr);
                let mut node = 0;
                for depth in 0..*len {
                    let bit = ((bits >> (31 - depth)) & 1) as usize;
                    if depth == *len - 1 {
                        nodes[node][bit] = Slot::Data(offset);
                        break;
                    }
                    let slot = nodes[node][bit];
                    node = match slot {
                        Slot::Node(next) => next,
                        _ => {
                            nodes.push([Slot::Empty; 2]);
                            let next = nodes.len() - 1;
                            nodes[node][bit] = Slot::Node(next);
                            next
                        }
                    };
                }
            }

            let node_count = nodes.len();
            let mut db = Vec::new();
            for node in &nodes {
                for slot in node {
                    let value = match *slot {
                        Slot::Empty => node_count,
                        Slot::Node(next) => next,
                        Slot::Data(offset) => node_count + 16 + offset,
                    };
                    db.extend_from_slice(&(value as u32).to_be_bytes()[1..]);
                }
            }
            db.extend_from_slice(&[0u8; 16]);
            db.extend(data);
            db.extend_from_slice(b"\xab\xcd\xefMaxMind.com");
            db.extend(map(&[
                ("binary_format_major_version", uint(5, 2, 1)),
                ("binary_format_minor_version", uint(5, 0, 0)),
                ("build_epoch", uint(9, 1_700_000_000, 4)),
                ("database_type", string("GeoIP2-Country")),
                ("description", map(&[("en", string("geo-enrich test data"))])),
                ("ip_version", uint(5, 4, 1)),
                ("languages", array(&[string("en")])),
                ("node_count", uint(6, node_count as u64, 4)),
                ("record_size", uint(5, 24, 1)),
            ]));
            db
        }
    }

    fn test_db() -> Vec<u8> {
        mmdb::build(&[
            (Ipv4Addr::new(8, 8, 8, 0), 24, mmdb::country("US")),
            (Ipv4Addr::new(200, 1, 0, 0), 16, mmdb::country("CL")),
            (Ipv4Addr::new(81, 2, 69, 0), 24, mmdb::country("GB")),
            (
                Ipv4Addr::new(10, 0, 0, 0),
                8,
                mmdb::map(&[("continent", mmdb::map(&[("code", mmdb::string("EU"))]))]),
            ),
        ])
    }

    fn filter() -> MaxMindGeoFilter {
        MaxMindGeoFilter::from_bytes(test_db()).unwrap()
    }

    fn code(cc: &str) -> CountryCode {
        CountryCode::parse(cc).unwrap()
    }

    #[test]
    fn test_database_type() {
        assert_eq!(filter().database_type(), "GeoIP2-Country");
    }

    #[test]
    fn test_country_of_known_networks() {
        let filter = filter();
        assert_eq!(filter.country_of("8.8.8.8").unwrap(), "US");
        assert_eq!(filter.country_of("200.1.2.3").unwrap(), "CL");
        assert_eq!(filter.country_of("81.2.69.142").unwrap(), "GB");
    }

    #[test]
    fn test_matches_target_country() {
        let filter = filter();
        assert!(filter.matches("8.8.8.8", &code("us")));
        assert!(filter.matches("200.1.255.254", &code("CL")));
        assert!(!filter.matches("8.8.8.8", &code("cl")));
        assert!(!filter.matches("81.2.69.142", &code("us")));
    }

    #[test]
    #[traced_test]
    fn test_unlisted_address_is_no_match() {
        let filter = filter();
        let err = filter.country_of("1.1.1.1").unwrap_err();
        assert!(err.to_string().contains("not found"));

        assert!(!filter.matches("1.1.1.1", &code("us")));
        assert!(!filter.matches("8.8.9.1", &code("us")));
        assert!(logs_contain("geo lookup failed for 1.1.1.1"));
    }

    #[test]
    #[traced_test]
    fn test_record_without_country_is_no_match() {
        let filter = filter();
        let err = filter.country_of("10.1.1.1").unwrap_err();
        assert!(err.to_string().contains("no country in record"));
        assert!(!filter.matches("10.1.1.1", &code("us")));
        assert!(logs_contain("geo lookup failed for 10.1.1.1"));
    }

    #[test]
    #[traced_test]
    fn test_malformed_address_is_no_match() {
        let filter = filter();
        assert!(!filter.matches("not-an-ip", &code("us")));
        assert!(logs_contain("geo lookup failed for not-an-ip"));
    }

    #[test]
    fn test_from_file_reads_database() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, &test_db()).unwrap();

        let filter = MaxMindGeoFilter::from_file(file.path().to_str().unwrap()).unwrap();
        assert!(filter.matches("8.8.8.8", &code("US")));
    }

    #[test]
    fn test_from_file_nonexistent() {
        let result = MaxMindGeoFilter::from_file("/nonexistent/path/GeoLite2-City.mmdb");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        let result = MaxMindGeoFilter::from_bytes(b"definitely not an mmdb file".to_vec());
        assert!(result.is_err());
    }

    #[test]
    fn test_from_bytes_rejects_empty() {
        assert!(MaxMindGeoFilter::from_bytes(Vec::new()).is_err());
    }

    #[test]
    fn test_parse_ip_v4_and_v6() {
        assert_eq!(
            parse_ip("8.8.8.8").unwrap(),
            IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8))
        );
        assert!(parse_ip("2001:4860:4860::8888").unwrap().is_ipv6());
        assert!(parse_ip(" 1.1.1.1 ").is_ok());
    }

    #[test]
    fn test_parse_ip_malformed() {
        let err = parse_ip("999.1.1.1").unwrap_err();
        assert!(err.to_string().contains("999.1.1.1"));
        assert!(parse_ip("").is_err());
        assert!(parse_ip("example.com").is_err());
    }

    #[test]
    fn test_city_record_shape() {
        let record: CountryResp = serde_json::from_value(serde_json::json!({
            "city": { "names": { "en": "Santiago" } },
            "country": { "iso_code": "CL", "names": { "en": "Chile" } },
            "location": { "latitude": -33.45, "longitude": -70.66 }
        }))
        .unwrap();
        assert_eq!(record.iso_code().as_deref(), Some("CL"));
    }

    #[test]
    fn test_record_without_country() {
        let record: CountryResp = serde_json::from_value(serde_json::json!({
            "continent": { "code": "EU" }
        }))
        .unwrap();
        assert_eq!(record.iso_code(), None);

        let record: CountryResp = serde_json::from_value(serde_json::json!({
            "country": { "names": { "en": "Nowhere" } }
        }))
        .unwrap();
        assert_eq!(record.iso_code(), None);
    }

    #[test]
    fn test_filter_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MaxMindGeoFilter>();
    }
}
