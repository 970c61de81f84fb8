//! IP List File Reader
//!
//! Reads the flat text file of addresses that feeds a run.

use std::net::IpAddr;
use std::path::{Path, PathBuf};

/// Input-source errors. These are fatal to a run.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("cannot read ip list {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read and parse an IP list file.
pub fn read_ip_list(path: impl AsRef<Path>) -> Result<Vec<String>, InputError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_ip_list(&contents))
}

/// One address per non-blank line.
///
/// Entries look like `address[:field...]`; everything from the first colon
/// on is dropped. A line that is itself a valid IP literal is kept whole so
/// IPv6 addresses survive.
pub fn parse_ip_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(parse_entry)
        .collect()
}

fn parse_entry(line: &str) -> Option<String> {
    if line.parse::<IpAddr>().is_ok() {
        return Some(line.to_string());
    }
    let first = line.split(':').next().unwrap_or_default().trim();
    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}
