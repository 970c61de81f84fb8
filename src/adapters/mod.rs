//! Adapters: concrete implementations of the domain ports (outbound) and
//! the input reader (inbound).

pub mod inbound;
pub mod outbound;
