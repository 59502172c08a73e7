//! Sliding-window rate limiting.
//!
//! Each identifier owns a log of admission instants, oldest first. A decision evicts
//! the stale prefix of that log, compares what is left against the cap, and records
//! the request only when it is admitted.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

use crate::config::RateLimitConfig;
use crate::security::clock::{Clock, SystemClock};

/// Per-identifier sliding-window limiter.
///
/// The ledger is sharded; a decision holds the write guard of the identifier's shard for
/// the whole evict-check-append sequence, so concurrent requests for one identifier are
/// linearized while other shards keep going.
pub struct RateLimiter {
    ledger: DashMap<String, VecDeque<Duration>>,
    max_requests: usize,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Limiter on the system clock.
    pub fn new(config: &RateLimitConfig) -> Self {
        Self::with_clock(
            config.max_requests,
            Duration::from_secs(config.window_secs),
            Arc::new(SystemClock::new()),
        )
    }

    pub fn with_clock(max_requests: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ledger: DashMap::new(),
            max_requests: max_requests as usize,
            window,
            clock,
        }
    }

    /// Decide for `identifier` at the clock's current time.
    ///
    /// The clock is read after the identifier's guard is taken so the log stays ordered.
    pub fn check(&self, identifier: &str) -> bool {
        if let Some(mut timestamps) = self.ledger.get_mut(identifier) {
            let now = self.clock.now();
            return self.decide(&mut timestamps, now);
        }
        let mut timestamps = self.ledger.entry(identifier.to_owned()).or_default();
        let now = self.clock.now();
        self.decide(&mut timestamps, now)
    }

    /// Decide for `identifier` at an explicit instant.
    pub fn admit(&self, identifier: &str, now: Duration) -> bool {
        if let Some(mut timestamps) = self.ledger.get_mut(identifier) {
            return self.decide(&mut timestamps, now);
        }
        let mut timestamps = self.ledger.entry(identifier.to_owned()).or_default();
        self.decide(&mut timestamps, now)
    }

    fn decide(&self, timestamps: &mut VecDeque<Duration>, now: Duration) -> bool {
        // Inclusive lower bound: an entry exactly `window` old is still counted.
        let cutoff = now.saturating_sub(self.window);
        while timestamps.front().is_some_and(|ts| *ts < cutoff) {
            timestamps.pop_front();
        }

        if timestamps.len() >= self.max_requests {
            return false;
        }

        timestamps.push_back(now);
        true
    }

    /// Drop identifiers whose newest admission is older than `idle_windows` windows.
    ///
    /// Returns the number of identifiers removed.
    pub fn sweep_idle(&self, idle_windows: u32) -> usize {
        let now = self.clock.now();
        let idle_cutoff = now.saturating_sub(self.window.saturating_mul(idle_windows.max(1)));

        let before = self.ledger.len();
        self.ledger
            .retain(|_, timestamps| timestamps.back().is_some_and(|last| *last >= idle_cutoff));
        before.saturating_sub(self.ledger.len())
    }

    /// Admissions currently inside the window for `identifier`, as of the last decision.
    pub fn recorded(&self, identifier: &str) -> usize {
        self.ledger.get(identifier).map(|t| t.len()).unwrap_or(0)
    }

    /// Number of identifiers held in the ledger.
    pub fn tracked_identifiers(&self) -> usize {
        self.ledger.len()
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::clock::ManualClock;
    use std::sync::Barrier;
    use std::thread;

    fn limiter(max: u32, window_secs: u64) -> (RateLimiter, ManualClock) {
        let clock = ManualClock::new();
        let limiter =
            RateLimiter::with_clock(max, Duration::from_secs(window_secs), Arc::new(clock.clone()));
        (limiter, clock)
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_sliding_window_admits_after_oldest_expires() {
        let (limiter, _) = limiter(3, 60);

        assert!(limiter.admit("client", secs(0)));
        assert!(limiter.admit("client", secs(10)));
        assert!(limiter.admit("client", secs(20)));
        assert!(!limiter.admit("client", secs(25)));
        // t=0 is now stale, t=10 and t=20 remain.
        assert!(limiter.admit("client", secs(61)));
        assert_eq!(limiter.recorded("client"), 3);
    }

    #[test]
    fn test_cap_then_full_window_elapsed() {
        let (limiter, clock) = limiter(5, 30);

        for _ in 0..5 {
            assert!(limiter.check("a"));
        }
        assert!(!limiter.check("a"));

        clock.advance(secs(31));
        assert!(limiter.check("a"));
        assert_eq!(limiter.recorded("a"), 1);
    }

    #[test]
    fn test_rejection_is_not_recorded() {
        let (limiter, _) = limiter(2, 60);

        assert!(limiter.admit("a", secs(0)));
        assert!(limiter.admit("a", secs(1)));
        for t in 2..50 {
            assert!(!limiter.admit("a", secs(t)));
        }
        assert_eq!(limiter.recorded("a"), 2);
        // Only the two admitted entries count, so the window frees up at t=61.
        assert!(limiter.admit("a", secs(61)));
    }

    #[test]
    fn test_window_lower_bound_is_inclusive() {
        let (limiter, _) = limiter(1, 60);

        assert!(limiter.admit("a", secs(0)));
        // Exactly `window` old: still inside.
        assert!(!limiter.admit("a", secs(60)));
        assert!(limiter.admit("a", Duration::from_millis(60_001)));
    }

    #[test]
    fn test_identifiers_are_independent() {
        let (limiter, _) = limiter(1, 60);

        assert!(limiter.admit("a", secs(0)));
        assert!(!limiter.admit("a", secs(1)));
        assert!(limiter.admit("b", secs(1)));
        assert_eq!(limiter.tracked_identifiers(), 2);
    }

    #[test]
    fn test_concurrent_same_identifier_never_over_admits() {
        let (limiter, _) = limiter(25, 60);
        let limiter = Arc::new(limiter);
        let threads = 100;
        let barrier = Arc::new(Barrier::new(threads));

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let limiter = limiter.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    limiter.check("shared")
                })
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(admitted, 25);
        assert_eq!(limiter.recorded("shared"), 25);
    }

    #[test]
    fn test_sweep_removes_only_idle_identifiers() {
        let (limiter, clock) = limiter(10, 60);

        clock.set_secs(0);
        assert!(limiter.check("idle"));
        clock.set_secs(200);
        assert!(limiter.check("active"));

        clock.set_secs(250);
        let removed = limiter.sweep_idle(3);

        assert_eq!(removed, 1);
        assert_eq!(limiter.recorded("idle"), 0);
        assert_eq!(limiter.recorded("active"), 1);
        assert_eq!(limiter.tracked_identifiers(), 1);
    }
}
