mod hickory_reverse_resolver;
mod maxmind_geo_filter;
mod memory_result_sink;
mod rdap_ownership_resolver;
mod stdout_result_sink;
pub mod whois_client;

pub use hickory_reverse_resolver::HickoryReverseResolver;
pub use maxmind_geo_filter::MaxMindGeoFilter;
pub use memory_result_sink::MemoryResultSink;
pub use rdap_ownership_resolver::{OwnershipConfig, RdapOwnershipResolver, DEFAULT_RDAP_URL};
pub use stdout_result_sink::{format_summary, print_summary, StdoutResultSink};
