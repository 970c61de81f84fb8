//! Query Throttle
//!
//! Politeness toward the upstream registry: a random pause before each
//! query, optionally combined with a global token bucket shared by all
//! workers.

use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Throttle configuration.
#[derive(Debug, Clone)]
pub struct ThrottleConfig {
    /// Lower bound of the random pause before each query
    pub min_delay: Duration,
    /// Upper bound of the random pause before each query
    pub max_delay: Duration,
    /// Global cap on queries per second (None = jitter only)
    pub max_per_sec: Option<f64>,
    /// Token bucket capacity when `max_per_sec` is set
    pub burst_size: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(500),
            max_delay: Duration::from_millis(2000),
            max_per_sec: None,
            burst_size: 1,
        }
    }
}

/// Global token bucket.
struct TokenBucket {
    /// Available tokens
    tokens: AtomicU64,
    /// Last refill timestamp (ms since throttle creation)
    last_refill_ms: AtomicU64,
    /// Tokens added per second
    rate_per_sec: f64,
    capacity: u64,
}

impl TokenBucket {
    fn new(max_per_sec: f64, capacity: u64) -> Self {
        let capacity = capacity.max(1);
        Self {
            tokens: AtomicU64::new(capacity),
            last_refill_ms: AtomicU64::new(0),
            rate_per_sec: max_per_sec,
            capacity,
        }
    }

    fn refill(&self, now_ms: u64) {
        let last_refill = self.last_refill_ms.load(Ordering::Acquire);
        let elapsed_ms = now_ms.saturating_sub(last_refill);
        let tokens_to_add = (elapsed_ms as f64 * self.rate_per_sec / 1000.0) as u64;

        if tokens_to_add == 0 {
            return;
        }
        // Only one caller gets to credit this interval.
        if self
            .last_refill_ms
            .compare_exchange(last_refill, now_ms, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            let _ = self
                .tokens
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                    Some((current + tokens_to_add).min(self.capacity))
                });
        }
    }

    fn try_take(&self, now_ms: u64) -> bool {
        self.refill(now_ms);

        let mut current = self.tokens.load(Ordering::Acquire);
        loop {
            if current == 0 {
                return false;
            }
            match self.tokens.compare_exchange_weak(
                current,
                current - 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(c) => current = c,
            }
        }
    }

    /// Time until the next token is expected.
    fn wait_hint(&self) -> Duration {
        let ms = (1000.0 / self.rate_per_sec).ceil().max(1.0) as u64;
        Duration::from_millis(ms)
    }
}

/// Shared throttle for outbound registry queries.
///
/// Safe to share across tasks behind an `Arc`; all state is atomic.
pub struct QueryThrottle {
    config: ThrottleConfig,
    bucket: Option<TokenBucket>,
    started: Instant,
    issued: AtomicU64,
}

impl QueryThrottle {
    /// Create a new throttle.
    pub fn new(config: ThrottleConfig) -> Self {
        let bucket = config
            .max_per_sec
            .filter(|rate| *rate > 0.0)
            .map(|rate| TokenBucket::new(rate, config.burst_size));
        Self {
            config,
            bucket,
            started: Instant::now(),
            issued: AtomicU64::new(0),
        }
    }

    /// Throttle that never waits.
    pub fn disabled() -> Self {
        Self::new(ThrottleConfig {
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            max_per_sec: None,
            burst_size: 1,
        })
    }

    /// Draw the random pause for the next query.
    pub fn jitter(&self) -> Duration {
        let min = self.config.min_delay.as_millis() as u64;
        let max = self.config.max_delay.as_millis() as u64;
        if max <= min {
            return Duration::from_millis(min);
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }

    /// Wait until the caller may issue one query.
    pub async fn acquire(&self) {
        let pause = self.jitter();
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }

        if let Some(bucket) = &self.bucket {
            while !bucket.try_take(self.now_ms()) {
                tokio::time::sleep(bucket.wait_hint()).await;
            }
        }

        let n = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::trace!("registry query #{} released after {:?} jitter", n, pause);
    }

    /// Number of queries released so far.
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::Relaxed)
    }

    pub fn config(&self) -> &ThrottleConfig {
        &self.config
    }

    fn now_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

impl Default for QueryThrottle {
    fn default() -> Self {
        Self::new(ThrottleConfig::default())
    }
}
