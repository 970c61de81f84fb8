//! Infrastructure Layer
//!
//! Cross-cutting runtime concerns: registry query throttling and run
//! cancellation.

pub mod rate_limiter;
pub mod shutdown;

pub use rate_limiter::{QueryThrottle, ThrottleConfig};
pub use shutdown::{shutdown_signal, InFlightGuard, ShutdownController};
