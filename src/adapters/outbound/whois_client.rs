//! Minimal WHOIS client
//!
//! Plain TCP (port 43) queries against Team Cymru style IP-to-ASN services.

use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Default IP-to-ASN WHOIS endpoint.
pub const DEFAULT_WHOIS_ADDR: &str = "whois.cymru.com:43";

/// Responses larger than this are truncated.
const MAX_RESPONSE_BYTES: u64 = 64 * 1024;

/// Send one WHOIS query to `addr` ("host:port") and return the raw response.
///
/// Connect, write and read each get the full timeout.
pub async fn query(addr: &str, query: &str, to: Duration) -> Result<String> {
    let mut stream = match timeout(to, TcpStream::connect(addr)).await {
        Ok(Ok(s)) => s,
        Ok(Err(e)) => return Err(anyhow!("connect error to {addr}: {e}")),
        Err(_) => return Err(anyhow!("connect timeout to {addr}")),
    };

    let line = format!("{query}\r\n");
    timeout(to, stream.write_all(line.as_bytes()))
        .await
        .map_err(|_| anyhow!("write timeout to {addr}"))??;

    let mut buf = Vec::new();
    timeout(to, (&mut stream).take(MAX_RESPONSE_BYTES).read_to_end(&mut buf))
        .await
        .map_err(|_| anyhow!("read timeout from {addr}"))??;

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Verbose single-address query (" -v <ip>").
pub fn cymru_query(ip: &str) -> String {
    format!(" -v {ip}")
}

/// ASN and BGP prefix from a verbose Cymru answer.
///
/// ```text
/// AS      | IP               | BGP Prefix          | CC | Registry | Allocated  | AS Name
/// 15169   | 8.8.8.8          | 8.8.8.0/24          | US | arin     | 2023-12-28 | GOOGLE, US
/// ```
///
/// "NA" columns (unannounced space) are reported as missing.
pub fn parse_cymru(response: &str) -> (Option<String>, Option<String>) {
    let row = response
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && l.contains('|'))
        .find(|l| !l.starts_with("AS ") && !l.starts_with("AS|") && !l.starts_with("Bulk mode"));

    let Some(row) = row else {
        return (None, None);
    };

    let fields: Vec<&str> = row.split('|').map(str::trim).collect();
    let column = |idx: usize| {
        fields
            .get(idx)
            .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("NA"))
            .map(|v| v.to_string())
    };

    let asn = column(0).filter(|v| v.chars().all(|c| c.is_ascii_digit()));
    let prefix = column(2).filter(|v| v.contains('/'));
    (asn, prefix)
}
