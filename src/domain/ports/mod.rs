mod geo_filter;
mod ownership_resolver;
mod result_sink;
mod reverse_resolver;

pub use geo_filter::GeoFilter;
pub use ownership_resolver::OwnershipResolver;
pub use result_sink::ResultSink;
pub use reverse_resolver::ReverseResolver;
